use pretty_assertions::assert_eq;
use v2x_trace_analyzer::aggregator::analyze_str;
use v2x_trace_analyzer::output::generate_report;

fn report_for(lines: &[&str]) -> String {
    let mut input = lines.join("\n");
    input.push('\n');
    generate_report(&analyze_str(&input).unwrap())
}

fn expected(lines: &[&str]) -> String {
    let mut s = lines.join("\n");
    s.push('\n');
    s
}

#[test]
fn test_empty_trace_report() {
    assert_eq!(
        report_for(&[]),
        expected(&[
            "Total layer time: 0 ns",
            " - se time: 0 ns",
            " - ecdsa time: 0 ns",
            "Time in layer functions:",
            "Time in HSM functions:",
            "Time in system functions:",
        ])
    );
}

#[test]
fn test_single_se_call_report() {
    assert_eq!(
        report_for(&[
            "[00:00:01.000000000] v2xsehsm:apiEntry apiFunctionID = 257",
            "[00:00:01.050000000] v2xsehsm:apiExit apiFunctionID = 257",
        ]),
        expected(&[
            "Total layer time: 50000000 ns",
            " - se time: 50000000 ns, 100.00% of total",
            "   - time in API: 50000000 ns, 100.00% of se, 100.00% of total",
            "   - time in HSM: 0 ns, 0.00% of se, 0.00% of total",
            "   - time in system: 0 ns, 0.00% of se, 0.00% of total",
            " - ecdsa time: 0 ns",
            "Time in layer functions:",
            "v2xSe_connect: 50000000 ns, 100.00% of se layer, 100.00% of total",
            " - time in API: 50000000 ns, 100.00% of function, 100.00% of se layer",
            " - time in HSM: 0 ns, 0.00% of API, 0.00% of function",
            " - time in system: 0 ns, 0.00% of API, 0.00% of function",
            " - max latency: 50000000 ns, 50.0 ms, ",
            " - min latency: 50000000 ns, 50.0 ms, ",
            "Time in HSM functions:",
            "Time in system functions:",
        ])
    );
}

#[test]
fn test_ecdsa_background_report() {
    assert_eq!(
        report_for(&[
            "[00:00:00.000001000] ecdsa:apiEntry apiFunctionID = 260",
            "[00:00:00.000002000] ecdsa:apiExit apiFunctionID = 260",
            "[00:00:00.000002000] ecdsa:startBackgroundProcessing apiFunctionID = 260",
            "[00:00:00.000003000] ecdsa:hsmCall apiFunctionID = 531",
            "[00:00:00.000004000] ecdsa:hsmReturn apiFunctionID = 531",
            "[00:00:00.000005000] ecdsa:endBackgroundProcessing apiFunctionID = 260",
        ]),
        expected(&[
            "Total layer time: 4000 ns",
            " - se time: 0 ns",
            " - ecdsa time: 4000 ns, 100.00% of total",
            "   - time in API: 1000 ns, 25.00% of ecdsa, 25.00% of total",
            "   - time in background: 3000 ns, 75.00% of ecdsa, 75.00% of total",
            "   - time in HSM: 1000 ns, 25.00% of ecdsa, 25.00% of total",
            "Time in layer functions:",
            "ecdsa_verify_signature: 4000 ns, 100.00% of ecdsa layer, 100.00% of total",
            " - time in API: 1000 ns, 25.00% of function, 25.00% of ecdsa layer",
            " - time in background: 3000 ns, 75.00% of function, 75.00% of ecdsa layer",
            " - time in HSM: 1000 ns, 33.33% of background, 25.00% of function",
            " - max latency: 4000 ns, 0.004 ms, ",
            " - min latency: 4000 ns, 0.004 ms, ",
            "Time in HSM functions:",
            "hsm_verify_signature: 1000 ns, 100.00% of hsm, 25.00% of total",
            " - max latency: 1000 ns, 0.001 ms, ",
            " - min latency: 1000 ns, 0.001 ms, ",
            "Time in system functions:",
        ])
    );
}

#[test]
fn test_ecdsa_without_background() {
    let report = report_for(&[
        "[00:00:00.000000000] ecdsa:apiEntry apiFunctionID = 264",
        "[00:00:00.000000100] ecdsa:hsmCall apiFunctionID = 539",
        "[00:00:00.000000150] ecdsa:hsmReturn apiFunctionID = 539",
        "[00:00:00.000000200] ecdsa:apiExit apiFunctionID = 264",
    ]);

    assert!(report.contains("ecdsa_sha256: 200 ns, 100.00% of ecdsa layer, 100.00% of total\n"));
    assert!(report.contains(" - time in background: 0 ns\n - time in HSM: 50 ns, 25.00% of function\n"));
    assert!(report.contains("hsm_hash_one_go: 50 ns, 100.00% of hsm, 25.00% of total\n"));
}

#[test]
fn test_hsm_without_layer_time_has_no_percentages() {
    let report = report_for(&[
        "[00:00:00.000000000] v2xsehsm:hsmCall apiFunctionID = 536",
        "[00:00:00.000000080] v2xsehsm:hsmReturn apiFunctionID = 536",
        "[00:00:00.000000100] v2xsehsm:systemCall apiFunctionID = 769",
        "[00:00:00.000000110] v2xsehsm:systemReturn apiFunctionID = 769",
    ]);

    assert!(report.contains("\nhsm_get_random: 80 ns\n"));
    assert!(report.contains("\nopen: 10 ns\n"));
    assert!(report.starts_with("Total layer time: 0 ns\n - se time: 0 ns\n"));
}

#[test]
fn test_report_is_deterministic() {
    let lines = [
        "[00:00:00.000000000] v2xsehsm:apiEntry apiFunctionID = 290",
        "[00:00:00.000000010] v2xsehsm:systemCall apiFunctionID = 770",
        "[00:00:00.000000030] v2xsehsm:systemReturn apiFunctionID = 770",
        "[00:00:00.000000040] v2xsehsm:apiExit apiFunctionID = 290",
    ];
    assert_eq!(report_for(&lines), report_for(&lines));
}
