//! End-to-end tests driving the library on FamilyScript text.

use std::fs;

use phado::config::Config;
use phado::context::Context;
use phado::familyscript::decode_str;
use phado::models::{FindingKind, GenerationSource, Individual};
use phado::services::{export, ExportService, TreeService, ValidationService};

const FAMILY: &str = "\
FamilyScript v1
iSTART\tpTổ\tlĐặng\tgm\tz1\toĐời thứ 1, Phái Nhất
iA\tpVăn An\tlĐặng\tgm\tfSTART\tmW\tb1950
iB\tpVăn Bình\tlĐặng\tgm\tfSTART\tmW\tb1960\toĐời thứ 5
iW\tpThị Hoa\tlNguyễn\tgf\tsSTART
iC\tpThị Cúc\tlĐặng\tgf\tfSTART
iD\tpVăn Dũng\tlĐặng\tgm\tmC
iE\tpVăn Em\tlNguyễn\tgm\tmW
iF\tpY\tlĐặng\tgm\tfA
iL\tpLẻ\tlĐặng\tgm
";

fn context(text: &str) -> Context {
    Context::from_individuals(decode_str(text).individuals, Config::default())
}

#[test]
fn test_generations_are_inferred_along_parent_links() {
    let ctx = context(FAMILY);
    let store = &ctx.store;

    let a = store.get("A").unwrap();
    assert_eq!(a.generation, Some(2));
    assert_eq!(a.generation_source, Some(GenerationSource::InferredFromFather));
    assert_eq!(a.inferred_from.as_deref(), Some("START"));

    // Clan mother with an inferred generation
    let d = store.get("D").unwrap();
    assert_eq!(d.generation, Some(3));
    assert_eq!(d.generation_source, Some(GenerationSource::InferredFromMother));

    // Spouse marrying in is placed from her first child
    let w = store.get("W").unwrap();
    assert_eq!(w.generation, Some(1));
    assert_eq!(w.generation_source, Some(GenerationSource::InferredFromChild));

    // Explicit values are never overwritten
    let b = store.get("B").unwrap();
    assert_eq!(b.generation, Some(5));
    assert_eq!(b.generation_source, Some(GenerationSource::Explicit));

    // Mother outside the clan does not place her child
    let e = store.get("E").unwrap();
    assert_eq!(e.generation, None);

    assert!(ctx.propagation.converged);
    assert_eq!(ctx.propagation.unassigned, 2);
}

#[test]
fn test_explicit_conflict_is_reported_once() {
    let ctx = context(FAMILY);
    let report = ValidationService::from(&ctx).validate();

    assert_eq!(report.gen_mismatches.len(), 1);
    let finding = &report.gen_mismatches[0];
    assert_eq!(finding.person_id, "B");
    match &finding.kind {
        FindingKind::GenMismatch {
            father_id,
            actual,
            expected,
            ..
        } => {
            assert_eq!(father_id, "START");
            assert_eq!((*actual, *expected), (5, 2));
        }
        other => panic!("unexpected finding {other:?}"),
    }

    let invalid: Vec<_> = report.invalid_names.iter().map(|f| f.person_id.as_str()).collect();
    assert_eq!(invalid, vec!["F"]);

    // Only the unlinked clan member; the founder and the outsider are excluded
    let orphans: Vec<_> = report.orphans.iter().map(|f| f.person_id.as_str()).collect();
    assert_eq!(orphans, vec!["L"]);
    assert!(!report.valid);
}

#[test]
fn test_tree_orders_children_by_birth_year() {
    let ctx = context(FAMILY);
    let tree = TreeService::from(&ctx).build_tree("START", None).unwrap();
    let order: Vec<_> = tree.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
    assert_eq!(tree.children[0].children[0].id, "F");
}

#[test]
fn test_father_cycle_yields_no_chain_and_terminates() {
    let ctx = context(
        "\
iA\tpAn\tlĐặng\tfC
iB\tpBình\tlĐặng\tfA
iC\tpCường\tlĐặng\tfB
",
    );
    assert!(ctx.propagation.converged);
    assert_eq!(ctx.propagation.unassigned, 3);

    let service = ValidationService::from(&ctx);
    assert!(service.trace_ancestor_chain("A", "START").is_none());
    assert!(service.annotate_chain("B").is_none());
}

#[test]
fn test_load_and_export_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("family.txt");
    fs::write(&input, FAMILY).unwrap();

    let ctx = Context::load(&input, Config::default()).unwrap();
    assert_eq!(ctx.decode.records, 9);
    assert_eq!(ctx.decode.skipped, 0);

    let out = dir.path().join("out");
    let summary = ExportService::from(&ctx).write_all(&out).unwrap();
    assert_eq!(summary.files.len(), 5);

    let dataset: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(export::DATASET_FILE)).unwrap()).unwrap();
    assert_eq!(dataset["metadata"]["total_members"], 9);
    assert_eq!(dataset["persons"]["A"]["generation_source"], "inferred-from-father");
    assert_eq!(dataset["persons"]["START"]["children_ids"].as_array().unwrap().len(), 3);
    assert_eq!(dataset["tree"]["id"], "START");

    let report = fs::read_to_string(out.join(export::ANOMALY_REPORT_FILE)).unwrap();
    assert!(report.contains("child: B, father: START"));

    let missing = fs::read_to_string(out.join(export::MISSING_GENERATIONS_FILE)).unwrap();
    assert_eq!(missing.lines().count(), 3);
    assert!(missing.contains("E\tNguyễn Văn Em\tN/A\tN/A\tno"));
    assert!(missing.contains("L\tĐặng Lẻ\tN/A\tN/A\tyes"));
}

#[test]
fn test_founder_override_changes_orphans() {
    let mut config = Config::default();
    config.lineage.founder_id = "L".to_string();
    let ctx = Context::from_individuals(decode_str(FAMILY).individuals, config);
    let report = ValidationService::from(&ctx).validate();
    assert!(report.orphans.is_empty());
    assert!(TreeService::from(&ctx).build_tree(ctx.founder_id(), None).is_some());
}

#[test]
fn test_oversized_generation_does_not_abort_the_run() {
    let ctx = context(
        "\
iSTART\tpTổ\tlĐặng\tgm\toĐời thứ 2147483647
iC\tpCon\tlĐặng\tgm\tfSTART
",
    );
    assert_eq!(ctx.store.get("START").unwrap().generation, None);
    assert_eq!(ctx.propagation.unassigned, 2);

    // Records built directly can still carry the extreme value
    let mut founder = Individual::new("START");
    founder.generation = Some(i32::MAX);
    founder.generation_source = Some(GenerationSource::Explicit);
    let mut child = Individual::new("C");
    child.father_id = Some("START".to_string());
    let ctx = Context::from_individuals(vec![founder, child], Config::default());
    assert_eq!(ctx.store.get("C").unwrap().generation, None);

    let dir = tempfile::tempdir().unwrap();
    let summary = ExportService::from(&ctx).write_all(dir.path()).unwrap();
    assert!(summary.report.gen_mismatches.is_empty());
}
