//! Bit-exact WSR-88D Volume Coverage Pattern tables: PRT bank, per-VCP cut
//! lists, elevation angles, PRT/pulse-count assignment (with batch-mode
//! split/surveillance pairs represented as two-element slots), and the
//! derived per-cut dwell times and average PRTs.
//!
//! Supported patterns: 21, 12, 11, 121, 31, 32.

use crate::time::Duration;

/// One slot in a VCP's per-cut PRT-bank assignment. Most cuts use a single
/// PRT bank for the whole cut; split-cut ("batch") elevations interleave
/// two banks and are represented as `Batch` so dwell time sums both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrtAssignment {
    /// A single PRT bank used for the whole cut, with its pulse count.
    Single { bank: usize, pulses: u32 },
    /// Two PRT banks interleaved within one cut (split-cut / batch mode),
    /// each with its own pulse count. Dwell time sums both contributions.
    Batch { first: (usize, u32), second: (usize, u32) },
}

/// Average PRT (in microseconds, rounded) of banks 1 through 8, per the
/// WSR-88D RDA PRT bank table. Bank `n` is `round(1e6 / rate_hz)`.
const PRT_BANK_US: [u32; 8] = [
    3106, // bank 1: 1e6 / 322
    2242, // bank 2: 1e6 / 446
    1553, // bank 3: 1e6 / 644
    1167, // bank 4: 1e6 / 857
    986,  // bank 5: 1e6 / 1014
    913,  // bank 6: 1e6 / 1095
    847,  // bank 7: 1e6 / 1181
    780,  // bank 8: 1e6 / 1282
];

fn prt_us(bank: usize) -> u32 {
    PRT_BANK_US[bank - 1]
}

/// A fully-resolved WSR-88D VCP: per-cut elevation angle, dwell time, and
/// average PRT, in cut execution order.
pub struct VcpTable {
    /// Elevation angle in degrees, one per cut, in execution order.
    pub elevations: &'static [f64],
    /// Grid elevation index each cut maps to (`WSR_88D_Cuts`).
    pub grid_indices: &'static [usize],
    per_cut_pulses: &'static [PrtAssignment],
}

impl VcpTable {
    /// Look up a VCP by its conventional number. `None` if unsupported.
    pub fn lookup(vcp: u32) -> Option<VcpTable> {
        Some(match vcp {
            21 => VcpTable { elevations: &VCP21_ELEVS, grid_indices: &VCP21_CUTS, per_cut_pulses: &VCP21_PULSES },
            12 => VcpTable { elevations: &VCP12_ELEVS, grid_indices: &VCP12_CUTS, per_cut_pulses: &VCP12_PULSES },
            11 => VcpTable { elevations: &VCP11_ELEVS, grid_indices: &VCP11_CUTS, per_cut_pulses: &VCP11_PULSES },
            121 => VcpTable { elevations: &VCP121_ELEVS, grid_indices: &VCP121_CUTS, per_cut_pulses: &VCP121_PULSES },
            31 => VcpTable { elevations: &VCP31_ELEVS, grid_indices: &VCP31_CUTS, per_cut_pulses: &VCP31_PULSES },
            32 => VcpTable { elevations: &VCP32_ELEVS, grid_indices: &VCP32_CUTS, per_cut_pulses: &VCP32_PULSES },
            _ => return None,
        })
    }

    /// Number of cuts in this pattern.
    pub fn cut_count(&self) -> usize {
        self.elevations.len()
    }

    /// Dwell time for cut `i`: sum of `pulses * prt` over every bank used
    /// by that cut (batch cuts sum two banks).
    pub fn dwell_time(&self, i: usize) -> Duration {
        let us = match self.per_cut_pulses[i] {
            PrtAssignment::Single { bank, pulses } => prt_us(bank) as u64 * pulses as u64,
            PrtAssignment::Batch { first, second } => {
                prt_us(first.0) as u64 * first.1 as u64 + prt_us(second.0) as u64 * second.1 as u64
            }
        };
        Duration::from_micros(us)
    }

    /// Average PRT for cut `i`: dwell time divided by total pulse count.
    pub fn prt(&self, i: usize) -> Duration {
        let total_pulses = match self.per_cut_pulses[i] {
            PrtAssignment::Single { pulses, .. } => pulses as u64,
            PrtAssignment::Batch { first, second } => first.1 as u64 + second.1 as u64,
        };
        Duration::from_micros(self.dwell_time(i).as_micros() / total_pulses)
    }
}

use PrtAssignment::{Batch, Single};

static VCP21_CUTS: [usize; 11] = [0, 0, 1, 1, 2, 3, 4, 5, 6, 7, 8];
static VCP21_ELEVS: [f64; 11] = [0.5, 0.5, 1.45, 1.45, 2.4, 3.35, 4.3, 6.0, 9.0, 14.6, 19.5];
static VCP21_PULSES: [PrtAssignment; 11] = [
    Single { bank: 1, pulses: 28 },
    Single { bank: 5, pulses: 88 },
    Single { bank: 1, pulses: 28 },
    Single { bank: 5, pulses: 88 },
    Batch { first: (2, 8), second: (5, 70) },
    Batch { first: (2, 8), second: (5, 70) },
    Batch { first: (2, 8), second: (5, 70) },
    Batch { first: (3, 12), second: (5, 70) },
    Single { bank: 7, pulses: 82 },
    Single { bank: 7, pulses: 82 },
    Single { bank: 7, pulses: 82 },
];

static VCP12_CUTS: [usize; 17] = [0, 0, 1, 1, 2, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
static VCP12_ELEVS: [f64; 17] = [
    0.5, 0.5, 0.9, 0.9, 1.3, 1.3, 1.8, 2.4, 3.1, 4.0, 5.1, 6.4, 8.0, 10.0, 12.5, 15.6, 19.5,
];
static VCP12_PULSES: [PrtAssignment; 17] = [
    Single { bank: 1, pulses: 15 },
    Single { bank: 5, pulses: 40 },
    Single { bank: 1, pulses: 15 },
    Single { bank: 5, pulses: 40 },
    Single { bank: 1, pulses: 15 },
    Single { bank: 5, pulses: 40 },
    Batch { first: (1, 3), second: (5, 40) },
    Batch { first: (2, 3), second: (5, 29) },
    Batch { first: (2, 3), second: (5, 30) },
    Batch { first: (2, 3), second: (5, 30) },
    Batch { first: (3, 3), second: (5, 30) },
    Batch { first: (3, 3), second: (5, 30) },
    Single { bank: 6, pulses: 38 },
    Single { bank: 7, pulses: 40 },
    Single { bank: 8, pulses: 44 },
    Single { bank: 8, pulses: 44 },
    Single { bank: 8, pulses: 44 },
];

static VCP11_CUTS: [usize; 16] = [0, 0, 1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
static VCP11_ELEVS: [f64; 16] = [
    0.5, 0.5, 1.45, 1.45, 2.4, 3.35, 4.3, 5.25, 6.2, 7.5, 8.7, 10.0, 12.0, 14.0, 16.7, 19.5,
];
static VCP11_PULSES: [PrtAssignment; 16] = [
    Single { bank: 1, pulses: 17 },
    Single { bank: 5, pulses: 52 },
    Single { bank: 1, pulses: 16 },
    Single { bank: 5, pulses: 52 },
    Batch { first: (1, 6), second: (5, 41) },
    Batch { first: (2, 6), second: (5, 41) },
    Batch { first: (2, 6), second: (5, 41) },
    Batch { first: (3, 10), second: (5, 41) },
    Batch { first: (3, 10), second: (5, 41) },
    Single { bank: 6, pulses: 43 },
    Single { bank: 7, pulses: 46 },
    Single { bank: 7, pulses: 46 },
    Single { bank: 7, pulses: 46 },
    Single { bank: 7, pulses: 46 },
    Single { bank: 7, pulses: 46 },
    Single { bank: 7, pulses: 46 },
];

static VCP121_CUTS: [usize; 19] =
    [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 4, 4, 5, 6, 7, 8];
static VCP121_ELEVS: [f64; 19] = [
    0.5, 0.5, 0.5, 0.5, 1.45, 1.45, 1.45, 1.45, 2.4, 2.4, 2.4, 3.35, 3.35, 4.3, 4.3, 6.0, 9.9, 14.6, 19.5,
];
static VCP121_PULSES: [PrtAssignment; 19] = [
    Single { bank: 1, pulses: 11 },
    Single { bank: 8, pulses: 43 },
    Single { bank: 6, pulses: 40 },
    Single { bank: 4, pulses: 40 },
    Single { bank: 1, pulses: 11 },
    Single { bank: 8, pulses: 43 },
    Single { bank: 6, pulses: 40 },
    Single { bank: 4, pulses: 40 },
    Batch { first: (1, 6), second: (8, 40) },
    Single { bank: 6, pulses: 40 },
    Single { bank: 4, pulses: 40 },
    Batch { first: (2, 6), second: (8, 40) },
    Single { bank: 6, pulses: 40 },
    Single { bank: 4, pulses: 40 },
    Batch { first: (2, 6), second: (4, 40) },
    Single { bank: 7, pulses: 40 },
    Batch { first: (3, 6), second: (5, 43) },
    Single { bank: 7, pulses: 43 },
    Single { bank: 8, pulses: 43 },
];

static VCP31_CUTS: [usize; 8] = [0, 0, 1, 1, 2, 2, 3, 4];
static VCP31_ELEVS: [f64; 8] = [0.5, 0.5, 1.5, 1.5, 2.5, 2.5, 3.5, 4.5];
static VCP31_PULSES: [PrtAssignment; 8] = [
    Single { bank: 1, pulses: 63 },
    Single { bank: 2, pulses: 87 },
    Single { bank: 1, pulses: 63 },
    Single { bank: 2, pulses: 87 },
    Single { bank: 1, pulses: 63 },
    Single { bank: 2, pulses: 87 },
    Single { bank: 2, pulses: 87 },
    Single { bank: 2, pulses: 87 },
];

static VCP32_CUTS: [usize; 7] = [0, 0, 1, 1, 2, 3, 4];
static VCP32_ELEVS: [f64; 7] = [0.5, 0.5, 1.5, 1.5, 2.5, 3.5, 4.5];
static VCP32_PULSES: [PrtAssignment; 7] = [
    Single { bank: 1, pulses: 64 },
    Single { bank: 5, pulses: 220 },
    Single { bank: 1, pulses: 64 },
    Single { bank: 5, pulses: 220 },
    Batch { first: (2, 11), second: (5, 220) },
    Batch { first: (2, 11), second: (5, 220) },
    Batch { first: (2, 11), second: (5, 220) },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcp21_has_nine_distinct_elevations_eleven_cuts() {
        let vcp = VcpTable::lookup(21).unwrap();
        assert_eq!(vcp.cut_count(), 11);
        assert_eq!(vcp.grid_indices.iter().copied().max().unwrap(), 8);
    }

    #[test]
    fn unsupported_vcp_returns_none() {
        assert!(VcpTable::lookup(999).is_none());
    }

    #[test]
    fn batch_cut_dwell_sums_both_banks() {
        let vcp = VcpTable::lookup(21).unwrap();
        // cut index 4: batch (bank 2, 8 pulses) + (bank 5, 70 pulses)
        let expected = prt_us(2) as u64 * 8 + prt_us(5) as u64 * 70;
        assert_eq!(vcp.dwell_time(4).as_micros(), expected);
    }

    #[test]
    fn prt_bank_table_matches_reciprocal_rates() {
        assert_eq!(prt_us(1), (1e6_f64 / 322.0).round() as u32);
        assert_eq!(prt_us(8), (1e6_f64 / 1282.0).round() as u32);
    }

    #[test]
    fn all_supported_vcps_resolve() {
        for vcp in [21, 12, 11, 121, 31, 32] {
            let table = VcpTable::lookup(vcp).unwrap();
            assert_eq!(table.elevations.len(), table.grid_indices.len());
            for i in 0..table.cut_count() {
                assert!(table.dwell_time(i).as_micros() > 0);
                assert!(table.prt(i).as_micros() > 0);
            }
        }
    }
}
