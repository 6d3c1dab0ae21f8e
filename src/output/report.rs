//! Text report of time spent per layer and per function.
//!
//! Sections, in order:
//! 1. total layer time
//! 2. SE layer breakdown (API, HSM, system)
//! 3. ECDSA layer breakdown (API, background, HSM)
//! 4. SE functions
//! 5. ECDSA functions
//! 6. HSM functions (both layers)
//! 7. system calls
//!
//! Percentages are only printed when every denominator on the line is
//! non-zero; otherwise the line stops after the nanosecond value.

use crate::aggregator::{Analysis, FunctionTimes, LatencyRange};
use crate::parser::{ECDSA_FUNCTIONS, HSM_FUNCTIONS, SE_FUNCTIONS, SYSTEM_FUNCTIONS};
use crate::utils::config::NS_PER_MS;

/// Render the full report
///
/// **Public** - used by the analyze command
pub fn generate_report(analysis: &Analysis) -> String {
    let mut lines = Vec::new();
    let agg = &analysis.aggregator;
    let total = agg.total_layer_ns;

    lines.push(format!("Total layer time: {} ns", total));

    if agg.se.total != 0 {
        lines.push(breakdown(" - se time", agg.se.total, &[(total, "total")]));
        for (label, value) in [
            ("   - time in API", agg.se.api),
            ("   - time in HSM", agg.se.hsm),
            ("   - time in system", agg.se.system),
        ] {
            lines.push(breakdown(label, value, &[(agg.se.total, "se"), (total, "total")]));
        }
    } else {
        lines.push(" - se time: 0 ns".to_string());
    }

    if agg.ecdsa.total != 0 {
        lines.push(breakdown(" - ecdsa time", agg.ecdsa.total, &[(total, "total")]));
        for (label, value) in [
            ("   - time in API", agg.ecdsa.api),
            ("   - time in background", agg.ecdsa.background),
            ("   - time in HSM", agg.ecdsa.hsm),
        ] {
            lines.push(breakdown(label, value, &[(agg.ecdsa.total, "ecdsa"), (total, "total")]));
        }
    } else {
        lines.push(" - ecdsa time: 0 ns".to_string());
    }

    lines.push("Time in layer functions:".to_string());

    for (&id, f) in agg.se_functions().iter().filter(|(_, f)| f.total != 0) {
        let name = SE_FUNCTIONS.display_name(id);
        lines.push(breakdown(&name, f.total, &[(agg.se.total, "se layer"), (total, "total")]));
        lines.push(breakdown(
            " - time in API",
            f.api,
            &[(f.total, "function"), (agg.se.total, "se layer")],
        ));
        lines.push(breakdown(" - time in HSM", f.hsm, &[(f.api, "API"), (f.total, "function")]));
        lines.push(breakdown(
            " - time in system",
            f.system,
            &[(f.api, "API"), (f.total, "function")],
        ));
        push_latency(&mut lines, &f.latency);
    }

    for (&id, f) in agg.ecdsa_functions().iter().filter(|(_, f)| f.total != 0) {
        let name = ECDSA_FUNCTIONS.display_name(id);
        lines.push(breakdown(
            &name,
            f.total,
            &[(agg.ecdsa.total, "ecdsa layer"), (total, "total")],
        ));
        lines.push(breakdown(
            " - time in API",
            f.api,
            &[(f.total, "function"), (agg.ecdsa.total, "ecdsa layer")],
        ));
        push_ecdsa_nested(&mut lines, f, agg.ecdsa.total);
        push_latency(&mut lines, &f.latency);
    }

    lines.push("Time in HSM functions:".to_string());
    for (&id, h) in agg.hsm_calls().iter().filter(|(_, h)| h.total != 0) {
        lines.push(breakdown(
            &HSM_FUNCTIONS.display_name(id),
            h.total,
            &[(agg.total_hsm_ns, "hsm"), (total, "total")],
        ));
        push_latency(&mut lines, &h.latency);
    }

    lines.push("Time in system functions:".to_string());
    for (&id, s) in agg.system_calls().iter().filter(|(_, s)| s.total != 0) {
        lines.push(breakdown(
            &SYSTEM_FUNCTIONS.display_name(id),
            s.total,
            &[(agg.total_system_ns, "system calls"), (total, "total")],
        ));
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Background and HSM lines of an ECDSA function
///
/// HSM work happens inside background processing, so HSM time is shown as
/// a share of background time when there is any.
fn push_ecdsa_nested(lines: &mut Vec<String>, f: &FunctionTimes, layer_total: u64) {
    if f.background != 0 {
        lines.push(breakdown(
            " - time in background",
            f.background,
            &[(f.total, "function"), (layer_total, "ecdsa layer")],
        ));
        if f.hsm != 0 {
            lines.push(breakdown(
                " - time in HSM",
                f.hsm,
                &[(f.background, "background"), (f.total, "function")],
            ));
        } else {
            lines.push(" - time in HSM: 0 ns".to_string());
        }
    } else {
        lines.push(" - time in background: 0 ns".to_string());
        if f.hsm != 0 {
            lines.push(breakdown(" - time in HSM", f.hsm, &[(f.total, "function")]));
        } else {
            lines.push(" - time in HSM: 0 ns".to_string());
        }
    }
}

fn push_latency(lines: &mut Vec<String>, latency: &LatencyRange) {
    if let (Some(min), Some(max)) = (latency.min(), latency.max()) {
        lines.push(format!(" - max latency: {} ns, {} ms, ", max, format_ms(max)));
        lines.push(format!(" - min latency: {} ns, {} ms, ", min, format_ms(min)));
    }
}

/// `label: N ns, P% of a, Q% of b`, or `label: N ns` if any denominator is 0
fn breakdown(label: &str, value: u64, shares: &[(u64, &str)]) -> String {
    let mut line = format!("{}: {} ns", label, value);

    if shares.iter().all(|(whole, _)| *whole != 0) {
        let parts: Vec<String> = shares
            .iter()
            .map(|(whole, name)| format!("{}% of {}", format_percent(value, *whole), name))
            .collect();
        line.push_str(", ");
        line.push_str(&parts.join(", "));
    }

    line
}

/// Percentage with two decimals, e.g. `12.50`
pub fn format_percent(part: u64, whole: u64) -> String {
    format!("{:3.2}", part as f64 * 100.0 / whole as f64)
}

/// Milliseconds as a float, keeping a trailing `.0` for whole values
///
/// Values below 1e-4 ms switch to exponent form, written with a sign and at
/// least two digits (`8e-05`).
pub fn format_ms(ns: u64) -> String {
    let ms = format!("{:?}", ns as f64 / NS_PER_MS);

    match ms.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_with_shares() {
        assert_eq!(
            breakdown(" - time in API", 25, &[(100, "se"), (200, "total")]),
            " - time in API: 25 ns, 25.00% of se, 12.50% of total"
        );
    }

    #[test]
    fn test_breakdown_zero_denominator() {
        assert_eq!(
            breakdown(" - time in HSM", 0, &[(0, "API"), (10, "function")]),
            " - time in HSM: 0 ns"
        );
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(50_000_000), "50.0");
        assert_eq!(format_ms(1_500_000), "1.5");
        assert_eq!(format_ms(123_456), "0.123456");
        assert_eq!(format_ms(100), "0.0001");
    }

    #[test]
    fn test_format_ms_small_values_use_two_digit_exponent() {
        assert_eq!(format_ms(80), "8e-05");
        assert_eq!(format_ms(10), "1e-05");
        assert_eq!(format_ms(1), "1e-06");
        assert_eq!(format_ms(15), "1.5e-05");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1, 3), "33.33");
        assert_eq!(format_percent(3, 3), "100.00");
        assert_eq!(format_percent(0, 3), "0.00");
    }
}
