//! Per-function and per-layer timing counters.
//!
//! The [`Aggregator`] receives every correlated call from the correlator and
//! folds its duration into the layer totals, the per-function breakdown and
//! the latency extrema. It is created once per run with every known function
//! pre-seeded and is only read back after the scan has finished.

use crate::parser::{
    Channel, FunctionTable, ECDSA_FUNCTIONS, HSM_FUNCTIONS, SE_FUNCTIONS, SYSTEM_FUNCTIONS,
};
use log::debug;
use std::collections::BTreeMap;

/// Smallest and largest single-call duration seen for a function
///
/// Both bounds are `None` until the first observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyRange {
    min: Option<u64>,
    max: Option<u64>,
}

impl LatencyRange {
    pub fn observe(&mut self, duration_ns: u64) {
        self.min = Some(self.min.map_or(duration_ns, |m| m.min(duration_ns)));
        self.max = Some(self.max.map_or(duration_ns, |m| m.max(duration_ns)));
    }

    pub fn min(&self) -> Option<u64> {
        self.min
    }

    pub fn max(&self) -> Option<u64> {
        self.max
    }

    pub fn is_set(&self) -> bool {
        self.max.is_some()
    }
}

/// Time breakdown for one SE or ECDSA API function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionTimes {
    /// Time attributed to the function at layer level (API + background)
    pub total: u64,
    /// Time between apiEntry and apiExit
    pub api: u64,
    /// HSM calls made while this function was the enclosing call
    pub hsm: u64,
    /// System calls made while this function was the enclosing call
    pub system: u64,
    /// ECDSA background processing started by this function
    pub background: u64,
    /// Completed apiEntry/apiExit pairs
    pub calls: u64,
    pub latency: LatencyRange,
}

/// Time spent in one HSM function or system call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTimes {
    pub total: u64,
    pub calls: u64,
    pub latency: LatencyRange,
}

/// Totals for one traced layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerTotals {
    /// Layer time counted into the grand total (API + background)
    pub total: u64,
    pub api: u64,
    pub hsm: u64,
    pub system: u64,
    pub background: u64,
}

/// A correlated open/close pair handed over by the correlator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedCall {
    pub channel: Channel,
    /// Function ID of the open event
    pub function_id: u32,
    /// Layer API function the call is nested in (equal to `function_id` for API calls)
    pub enclosing_id: u32,
    pub duration_ns: u64,
}

/// Accumulated timing state for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregator {
    /// SE + ECDSA layer time, excluding nested HSM and system time
    pub total_layer_ns: u64,
    pub se: LayerTotals,
    pub ecdsa: LayerTotals,
    pub total_hsm_ns: u64,
    pub total_system_ns: u64,
    se_functions: BTreeMap<u32, FunctionTimes>,
    ecdsa_functions: BTreeMap<u32, FunctionTimes>,
    hsm_calls: BTreeMap<u32, CallTimes>,
    system_calls: BTreeMap<u32, CallTimes>,
}

impl Aggregator {
    /// Create an aggregator with every known function seeded at zero
    pub fn new() -> Self {
        Self {
            total_layer_ns: 0,
            se: LayerTotals::default(),
            ecdsa: LayerTotals::default(),
            total_hsm_ns: 0,
            total_system_ns: 0,
            se_functions: seeded(&SE_FUNCTIONS),
            ecdsa_functions: seeded(&ECDSA_FUNCTIONS),
            hsm_calls: seeded(&HSM_FUNCTIONS),
            system_calls: seeded(&SYSTEM_FUNCTIONS),
        }
    }

    /// Fold one completed call into the counters
    pub fn record(&mut self, call: &CompletedCall) {
        let d = call.duration_ns;

        match call.channel {
            Channel::SeApi => {
                self.total_layer_ns += d;
                self.se.total += d;
                self.se.api += d;
                let f = slot(&mut self.se_functions, &SE_FUNCTIONS, call.function_id);
                f.total += d;
                f.api += d;
                f.calls += 1;
                f.latency.observe(d);
            }
            Channel::SeHsm => {
                // Nested in the API call, not part of the layer total
                self.se.hsm += d;
                slot(&mut self.se_functions, &SE_FUNCTIONS, call.enclosing_id).hsm += d;
                self.record_hsm(call.function_id, d);
            }
            Channel::SeSystem => {
                self.se.system += d;
                slot(&mut self.se_functions, &SE_FUNCTIONS, call.enclosing_id).system += d;
                let s = slot(&mut self.system_calls, &SYSTEM_FUNCTIONS, call.function_id);
                s.total += d;
                s.calls += 1;
                s.latency.observe(d);
                self.total_system_ns += d;
            }
            Channel::EcdsaApi => {
                self.total_layer_ns += d;
                self.ecdsa.total += d;
                self.ecdsa.api += d;
                let f = slot(&mut self.ecdsa_functions, &ECDSA_FUNCTIONS, call.function_id);
                f.total += d;
                f.api += d;
                f.calls += 1;
            }
            Channel::EcdsaHsm => {
                // Nested in background processing, not part of the layer total
                self.ecdsa.hsm += d;
                slot(&mut self.ecdsa_functions, &ECDSA_FUNCTIONS, call.enclosing_id).hsm += d;
                self.record_hsm(call.function_id, d);
            }
            Channel::EcdsaBackground => {
                self.total_layer_ns += d;
                self.ecdsa.total += d;
                self.ecdsa.background += d;
                let f = slot(&mut self.ecdsa_functions, &ECDSA_FUNCTIONS, call.enclosing_id);
                f.total += d;
                f.background += d;
            }
        }
    }

    /// Record one apiEntry-to-apiEntry latency window of an ECDSA function
    pub fn record_outer_latency(&mut self, function_id: u32, latency_ns: u64) {
        slot(&mut self.ecdsa_functions, &ECDSA_FUNCTIONS, function_id)
            .latency
            .observe(latency_ns);
    }

    fn record_hsm(&mut self, function_id: u32, d: u64) {
        let h = slot(&mut self.hsm_calls, &HSM_FUNCTIONS, function_id);
        h.total += d;
        h.calls += 1;
        h.latency.observe(d);
        self.total_hsm_ns += d;
    }

    pub fn se_functions(&self) -> &BTreeMap<u32, FunctionTimes> {
        &self.se_functions
    }

    pub fn ecdsa_functions(&self) -> &BTreeMap<u32, FunctionTimes> {
        &self.ecdsa_functions
    }

    pub fn hsm_calls(&self) -> &BTreeMap<u32, CallTimes> {
        &self.hsm_calls
    }

    pub fn system_calls(&self) -> &BTreeMap<u32, CallTimes> {
        &self.system_calls
    }

    pub fn se_function(&self, id: u32) -> Option<&FunctionTimes> {
        self.se_functions.get(&id)
    }

    pub fn ecdsa_function(&self, id: u32) -> Option<&FunctionTimes> {
        self.ecdsa_functions.get(&id)
    }

    pub fn hsm_call(&self, id: u32) -> Option<&CallTimes> {
        self.hsm_calls.get(&id)
    }

    pub fn system_call(&self, id: u32) -> Option<&CallTimes> {
        self.system_calls.get(&id)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn seeded<T: Default>(table: &FunctionTable) -> BTreeMap<u32, T> {
    table.ids().map(|id| (id, T::default())).collect()
}

/// Counter slot for `id`, inserting codes the table does not know
fn slot<'a, T: Default>(
    map: &'a mut BTreeMap<u32, T>,
    table: &FunctionTable,
    id: u32,
) -> &'a mut T {
    map.entry(id).or_insert_with(|| {
        debug!("Function ID {:#06x} not in table, tracking as {}", id, table.display_name(id));
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(channel: Channel, function_id: u32, enclosing_id: u32, duration_ns: u64) -> CompletedCall {
        CompletedCall { channel, function_id, enclosing_id, duration_ns }
    }

    #[test]
    fn test_latency_range_unset() {
        let range = LatencyRange::default();
        assert!(!range.is_set());
        assert_eq!(range.min(), None);
        assert_eq!(range.max(), None);
    }

    #[test]
    fn test_latency_range_observe() {
        let mut range = LatencyRange::default();
        for d in [30, 10, 50, 20] {
            range.observe(d);
        }
        assert_eq!(range.min(), Some(10));
        assert_eq!(range.max(), Some(50));
    }

    #[test]
    fn test_seeded_tables() {
        let agg = Aggregator::new();
        assert_eq!(agg.se_functions().len(), SE_FUNCTIONS.len());
        assert_eq!(agg.hsm_calls().len(), HSM_FUNCTIONS.len());
        assert_eq!(agg.se_function(0x0101), Some(&FunctionTimes::default()));
    }

    #[test]
    fn test_nested_hsm_not_in_layer_total() {
        let mut agg = Aggregator::new();
        agg.record(&call(Channel::SeHsm, 0x0210, 0x010E, 400));
        agg.record(&call(Channel::SeApi, 0x010E, 0x010E, 1000));

        assert_eq!(agg.total_layer_ns, 1000);
        assert_eq!(agg.se.total, 1000);
        assert_eq!(agg.se.hsm, 400);
        assert_eq!(agg.total_hsm_ns, 400);
        let f = agg.se_function(0x010E).unwrap();
        assert_eq!(f.total, 1000);
        assert_eq!(f.hsm, 400);
        assert_eq!(agg.hsm_call(0x0210).unwrap().latency.max(), Some(400));
    }

    #[test]
    fn test_background_goes_to_enclosing() {
        let mut agg = Aggregator::new();
        agg.record(&call(Channel::EcdsaApi, 0x0104, 0x0104, 100));
        agg.record(&call(Channel::EcdsaBackground, 0x0104, 0x0104, 900));

        assert_eq!(agg.ecdsa.total, 1000);
        assert_eq!(agg.ecdsa.background, 900);
        assert_eq!(agg.total_layer_ns, 1000);
        let f = agg.ecdsa_function(0x0104).unwrap();
        assert_eq!((f.total, f.api, f.background, f.calls), (1000, 100, 900, 1));
        assert!(!f.latency.is_set());
    }

    #[test]
    fn test_unknown_function_tracked() {
        let mut agg = Aggregator::new();
        agg.record(&call(Channel::SeSystem, 0x0399, 0x0101, 7));
        assert_eq!(agg.system_call(0x0399).unwrap().total, 7);
        assert_eq!(agg.total_system_ns, 7);
    }
}
