use super::*;

fn progress(done: u64) -> Diagnostic {
    Diagnostic::RenderProgress {
        frames_done: done,
        frames_total: 10,
    }
}

#[test]
fn collecting_sink_keeps_order_and_drains() {
    let sink = CollectingSink::new();
    sink.record(progress(1));
    sink.record(progress(2));
    assert_eq!(sink.count_kind("render_progress"), 2);
    assert_eq!(sink.drain(), vec![progress(1), progress(2)]);
    assert!(sink.records().is_empty());
}

#[test]
fn channel_sink_forwards_and_survives_disconnect() {
    let (sink, rx) = ChannelSink::new();
    sink.record(progress(3));
    assert_eq!(rx.recv().unwrap(), progress(3));
    drop(rx);
    sink.record(progress(4));
}

#[test]
fn tee_reaches_both_sinks() {
    let a = CollectingSink::new();
    let b = CollectingSink::new();
    TeeSink::new(&a, &b).record(progress(5));
    assert_eq!(a.records().len(), 1);
    assert_eq!(b.records().len(), 1);
}

#[test]
fn records_serialize_with_kind_tag() {
    let json = serde_json::to_value(Diagnostic::PrecisionDeviation {
        pocket_index: 3,
        deviation_rad: 0.5,
        tolerance_rad: 0.1,
    })
    .unwrap();
    assert_eq!(json["kind"], "precision_deviation");
    assert_eq!(json["pocket_index"], 3);
}
