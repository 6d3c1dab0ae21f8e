use v2x_trace_analyzer::parser::{
    classify_line, extract_function_id, parse_timestamp_ns, LineClass, TraceEvent, TracepointKind,
};
use v2x_trace_analyzer::utils::ParseError;

#[test]
fn test_line_without_bracket_is_skipped() {
    assert_eq!(classify_line("Trace directory: /tmp"), LineClass::Skipped);
    assert_eq!(classify_line(""), LineClass::Skipped);
    assert_eq!(classify_line(" [00:00:01.000000000] v2xsehsm:apiEntry"), LineClass::Skipped);
}

#[test]
fn test_classify_plain_record() {
    assert_eq!(
        classify_line("[00:00:01.050000000] v2xsehsm:apiExit apiFunctionID = 257"),
        LineClass::Event(TraceEvent {
            timestamp_ns: 1_050_000_000,
            kind: TracepointKind::SeApiExit,
            function_id: 257,
        })
    );
}

#[test]
fn test_classify_babeltrace_record() {
    let line = "[14:02:11.480128377] (+0.000004862) imx8 ecdsa:startBackgroundProcessing: \
                { cpu_id = 2 }, { apiFunctionID = 261 }";

    match classify_line(line) {
        LineClass::Event(event) => {
            assert_eq!(event.kind, TracepointKind::EcdsaStartBackground);
            assert_eq!(event.function_id, 261);
            assert_eq!(event.timestamp_ns, ((14 * 60 + 2) * 60 + 11) * 1_000_000_000 + 480_128_377);
        }
        other => panic!("expected event, got {:?}", other),
    }
}

#[test]
fn test_every_tag_recognized() {
    for kind in TracepointKind::ALL {
        let line = format!("[00:00:00.000000001] host {}: {{ apiFunctionID = 1 }}", kind.tag());
        assert_eq!(
            classify_line(&line),
            LineClass::Event(TraceEvent { timestamp_ns: 1, kind, function_id: 1 })
        );
    }
}

#[test]
fn test_unknown_tracepoint() {
    assert_eq!(
        classify_line("[00:00:02.000000000] lttng_ust_statedump:start"),
        LineClass::Unknown { timestamp_ns: 2_000_000_000 }
    );
}

#[test]
fn test_malformed_timestamp() {
    assert!(matches!(
        classify_line("[25:61:00.0] v2xsehsm:apiEntry"),
        LineClass::Malformed(ParseError::InvalidTimestamp(_))
    ));
    assert_eq!(
        classify_line("[00:00:00.000000000 v2xsehsm:apiEntry"),
        LineClass::Malformed(ParseError::UnterminatedTimestamp)
    );
}

#[test]
fn test_missing_function_id_defaults_to_zero() {
    assert_eq!(extract_function_id("[00:00:00.0] ecdsa:apiEntry"), 0);
    assert_eq!(extract_function_id("{ apiFunctionID = 4294967296 }"), 0);
    assert_eq!(extract_function_id("{ apiFunctionID = 531 }"), 531);
}

#[test]
fn test_timestamp_short_fraction() {
    // Fraction digits are read as a decimal fraction of a second
    assert_eq!(parse_timestamp_ns("[00:00:01.5]"), Ok(1_500_000_000));
}
