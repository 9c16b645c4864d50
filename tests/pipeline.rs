use std::path::Path;

use fanwatch::abi::{FAN_CREATE, FAN_DELETE, FAN_MODIFY, FAN_MOVED_FROM, FAN_MOVED_TO, FAN_ONDIR};
use fanwatch::pipeline::{Outcome, Pipeline};
use fanwatch::resolve::mock::MockResolver;
use fanwatch::{AcceptAll, ChangeEvent, ChangeKind, EventError, GlobFilter, WatchError};
use fanwatch_test_utils::harness::drive;
use fanwatch_test_utils::init_tracing;
use fanwatch_test_utils::records::{RecordBuilder, stream};
use tokio::sync::mpsc;

fn handle(n: u8) -> Vec<u8> {
    vec![n, 0, 0, n, 0xaa, 0xbb, 0xcc, n]
}

fn resolver_with(entries: &[(u8, &str)]) -> MockResolver {
    let resolver = MockResolver::new();
    for (n, path) in entries {
        resolver.add(handle(*n), path);
    }
    resolver
}

#[test]
fn one_event_per_fid_record_in_input_order() {
    init_tracing();
    let resolver = resolver_with(&[(1, "/data"), (2, "/data/a.txt"), (3, "/data/sub")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        RecordBuilder::fid(FAN_MODIFY, handle(2)).build(),
        RecordBuilder::fid(FAN_DELETE | FAN_ONDIR, handle(3)).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);

    assert_eq!(
        harvest.events,
        vec![
            ChangeEvent::new("/data", ChangeKind::Create),
            ChangeEvent::new("/data/a.txt", ChangeKind::Modify),
            ChangeEvent::new("/data/sub", ChangeKind::Delete),
        ]
    );
    assert_eq!(harvest.stats.dispatched, 3);
    assert_eq!(harvest.stats.errors(), 0);
    assert!(matches!(harvest.error, WatchError::FatalRead(_)));
}

#[test]
fn truncated_handle_is_dropped_and_loop_continues() {
    init_tracing();
    let resolver = resolver_with(&[(1, "/data"), (2, "/data/b")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        RecordBuilder::fid(FAN_CREATE, handle(9))
            .declared_handle_len(200)
            .build(),
        RecordBuilder::fid(FAN_MODIFY, handle(2)).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);

    assert_eq!(harvest.events.len(), 2);
    assert_eq!(harvest.events[0].path, Path::new("/data"));
    assert_eq!(harvest.events[1].path, Path::new("/data/b"));
    assert_eq!(harvest.stats.decode_errors, 1);
    assert!(matches!(
        harvest.outcomes[1],
        Outcome::DecodeFailed(fanwatch::DecodeError::TruncatedHandle { declared: 200, .. })
    ));
}

#[test]
fn filtered_paths_never_reach_the_queue() {
    let resolver = resolver_with(&[(1, "/data/.git"), (2, "/data/.git/index"), (3, "/data/src")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        RecordBuilder::fid(FAN_MODIFY, handle(2)).build(),
        RecordBuilder::fid(FAN_DELETE, handle(1)).build(),
        RecordBuilder::fid(FAN_MOVED_TO, handle(3)).build(),
    ]);
    let filter = |path: &Path| path.starts_with("/data/.git");

    let harvest = drive(input, resolver, filter);

    assert_eq!(
        harvest.events,
        vec![ChangeEvent::new("/data/src", ChangeKind::Create)]
    );
    assert_eq!(harvest.stats.filtered, 3);
    assert_eq!(harvest.stats.errors(), 0);
}

#[test]
fn filter_rejecting_everything_yields_no_events_for_any_kind() {
    let resolver = resolver_with(&[(1, "/x")]);
    let input = stream(
        [FAN_CREATE, FAN_DELETE, FAN_MODIFY, FAN_MOVED_FROM, FAN_MOVED_TO]
            .into_iter()
            .map(|mask| RecordBuilder::fid(mask, handle(1)).build()),
    );

    let harvest = drive(input, resolver, |_: &Path| true);

    assert!(harvest.events.is_empty());
    assert_eq!(harvest.stats.filtered, 5);
}

#[test]
fn glob_filter_drops_excluded_paths() {
    let resolver = resolver_with(&[(1, "/srv/app/build.tmp"), (2, "/srv/app/src"), (3, "/etc")]);
    let input = stream([
        RecordBuilder::fid(FAN_MODIFY, handle(1)).build(),
        RecordBuilder::fid(FAN_CREATE, handle(2)).build(),
        RecordBuilder::fid(FAN_CREATE, handle(3)).build(),
    ]);
    let filter = GlobFilter::new(&[], &["**/*.tmp".to_string()])
        .unwrap()
        .within("/srv/app");

    let harvest = drive(input, resolver, filter);

    assert_eq!(
        harvest.events,
        vec![ChangeEvent::new("/srv/app/src", ChangeKind::Create)]
    );
}

#[test]
fn burst_of_mixed_events_keeps_kernel_order() {
    let n = 200u8;
    let resolver = MockResolver::new();
    let masks = [FAN_CREATE, FAN_MODIFY, FAN_DELETE, FAN_MOVED_TO, FAN_MOVED_FROM];
    let mut records = Vec::new();
    let mut expected = Vec::new();
    for i in 0..n {
        let path = format!("/burst/{i}");
        resolver.add(handle(i), &path);
        let mask = masks[i as usize % masks.len()];
        records.push(RecordBuilder::fid(mask, handle(i)).build());
        expected.push(ChangeEvent::new(path, fanwatch::classify(mask)));
    }

    let harvest = drive(stream(records), resolver, AcceptAll);

    assert_eq!(harvest.events, expected);
}

#[test]
fn non_fid_records_produce_no_events_and_no_errors() {
    let resolver = resolver_with(&[(1, "/data")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).info_type(2).build(),
        RecordBuilder::fid(FAN_CREATE, handle(1)).info_type(3).build(),
        RecordBuilder::fid(FAN_CREATE, handle(1)).info_type(0).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);

    assert!(harvest.events.is_empty());
    assert_eq!(harvest.stats.skipped, 3);
    assert_eq!(harvest.stats.errors(), 0);
}

#[test]
fn unresolvable_handle_is_counted_and_skipped() {
    let resolver = resolver_with(&[(2, "/ok")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        RecordBuilder::fid(FAN_CREATE, handle(2)).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);

    assert_eq!(harvest.events, vec![ChangeEvent::new("/ok", ChangeKind::Create)]);
    assert_eq!(harvest.stats.resolve_errors, 1);
    assert!(matches!(
        harvest.outcomes[0],
        Outcome::ResolveFailed(fanwatch::ResolveError::Handle(_))
    ));
}

#[test]
fn overflow_is_counted_without_an_event() {
    let resolver = resolver_with(&[(1, "/data")]);
    let input = stream([
        RecordBuilder::overflow().build(),
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);

    assert_eq!(harvest.stats.overflows, 1);
    assert_eq!(harvest.events.len(), 1);
}

#[test]
fn paths_over_the_limit_are_dropped() {
    let resolver = resolver_with(&[(1, "/short"), (2, "/a/much/longer/path/than/allowed")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(2)).build(),
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
    ]);
    let (tx, mut rx) = mpsc::channel(8);
    let mut pipeline = Pipeline::new(resolver, AcceptAll, tx).with_max_path_len(Some(10));
    let mut reader = input;

    let first = pipeline.process_next(&mut reader).unwrap();
    assert!(matches!(
        first,
        Outcome::ResolveFailed(fanwatch::ResolveError::PathTooLong { max: 10, .. })
    ));
    let second = pipeline.process_next(&mut reader).unwrap();
    assert!(matches!(second, Outcome::Dispatched(ChangeKind::Create)));

    assert_eq!(rx.try_recv().unwrap().path, Path::new("/short"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn closed_sink_stops_the_loop() {
    let resolver = resolver_with(&[(1, "/data")]);
    let mut input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
    ]);
    let (tx, rx) = mpsc::channel(8);
    drop(rx);
    let mut pipeline = Pipeline::new(resolver, AcceptAll, tx);

    let result = pipeline.run(&mut input);
    assert!(matches!(result, Err(WatchError::SinkClosed)));
}

#[test]
fn filtered_events_do_not_need_a_live_sink() {
    let resolver = resolver_with(&[(1, "/data")]);
    let mut input = stream([RecordBuilder::fid(FAN_CREATE, handle(1)).build()]);
    let (tx, rx) = mpsc::channel(8);
    drop(rx);
    let mut pipeline = Pipeline::new(resolver, |_: &Path| true, tx);

    assert!(matches!(
        pipeline.process_next(&mut input),
        Ok(Outcome::Filtered)
    ));
}

#[test]
fn failed_outcomes_carry_an_event_error() {
    let resolver = resolver_with(&[(2, "/ok")]);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        RecordBuilder::fid(FAN_CREATE, Vec::new()).build(),
        RecordBuilder::fid(FAN_CREATE, handle(2)).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);
    let errors: Vec<_> = harvest
        .outcomes
        .into_iter()
        .map(Outcome::into_error)
        .collect();

    assert!(matches!(errors[0], Some(EventError::Resolve(_))));
    assert!(matches!(errors[1], Some(EventError::Decode(_))));
    assert!(errors[2].is_none());
}

#[test]
fn malformed_header_does_not_swallow_later_events() {
    init_tracing();
    let resolver = resolver_with(&[(1, "/data/a"), (2, "/data/b")]);
    let mut overlong_metadata = RecordBuilder::fid(FAN_CREATE, Vec::new())
        .without_info()
        .metadata_len(48)
        .event_len(40)
        .build();
    overlong_metadata.truncate(40);
    let input = stream([
        RecordBuilder::fid(FAN_CREATE, handle(9)).metadata_len(16).build(),
        RecordBuilder::fid(FAN_CREATE, handle(1)).build(),
        overlong_metadata,
        RecordBuilder::fid(FAN_DELETE, handle(2)).build(),
    ]);

    let harvest = drive(input, resolver, AcceptAll);

    assert_eq!(
        harvest.events,
        vec![
            ChangeEvent::new("/data/a", ChangeKind::Create),
            ChangeEvent::new("/data/b", ChangeKind::Delete),
        ]
    );
    assert_eq!(harvest.stats.decode_errors, 2);
    assert!(matches!(harvest.error, WatchError::FatalRead(_)));
}

#[test]
fn descriptor_named_by_a_malformed_header_stays_open() {
    use std::os::fd::AsRawFd;

    let owned = tempfile::tempfile().unwrap();
    let mut input = stream([RecordBuilder::fid(FAN_CREATE, handle(1))
        .metadata_len(16)
        .fd(owned.as_raw_fd())
        .build()]);
    let (tx, _rx) = mpsc::channel(8);
    let mut pipeline =
        Pipeline::new(resolver_with(&[(1, "/data")]), AcceptAll, tx).closing_event_fds(true);

    let outcome = pipeline.process_next(&mut input).unwrap();

    assert!(matches!(
        outcome,
        Outcome::DecodeFailed(fanwatch::DecodeError::MalformedHeader { .. })
    ));
    assert!(owned.metadata().is_ok());
}
