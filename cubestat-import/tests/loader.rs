use std::io::Write;
use std::path::Path;

use cubestat_core::{Gender, Mark};
use cubestat_db::{find_person_by_id, metadata, open_readonly, results_for_person};
use cubestat_import::*;
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, entries: &[(&str, String)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, body) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn tsv(lines: &[&str]) -> String {
    let mut s = lines.join("\n");
    s.push('\n');
    s
}

fn current_layout(single_rows: &[&str]) -> Vec<(&'static str, String)> {
    let mut singles = vec!["person_id\tevent_id\tbest\tworld_rank\tcontinent_rank\tcountry_rank"];
    singles.extend_from_slice(single_rows);
    vec![
        (
            "metadata.json",
            r#"{"export_date":"2026-10-15T00:00:12Z","export_format_version":"2.0.0"}"#
                .to_string(),
        ),
        (
            "continents.tsv",
            tsv(&["id\tname", "_Asia\tAsia", "_Oceania\tOceania"]),
        ),
        (
            "countries.tsv",
            tsv(&[
                "id\tname\tcontinent_id\tiso2",
                "China\tChina\t_Asia\tCN",
                "Australia\tAustralia\t_Oceania\tAU",
                "Peru\tPeru\t\tPE",
            ]),
        ),
        (
            "events.tsv",
            tsv(&[
                "id\tname\trank\tformat",
                "333\t3x3x3 Cube\t10\ttime",
                "333fm\t3x3x3 Fewest Moves\t70\tnumber",
            ]),
        ),
        (
            "persons.tsv",
            tsv(&[
                "name\tgender\twca_id\tsub_id\tcountry_id",
                "Yiheng Wang (王艺衡)\tm\t2019WANY36\t1\tChina",
                "Old Name\tm\t2019WANY36\t2\tChina",
                "Feliks Zemdegs\tm\t2009ZEMD01\t1\tAustralia",
                "Nicolás Núñez\t\t2015NUNE01\t1\tPeru",
            ]),
        ),
        ("ranks_single.tsv", tsv(&singles)),
        (
            "ranks_average.tsv",
            tsv(&[
                "person_id\tevent_id\tbest\tworld_rank\tcontinent_rank\tcountry_rank",
                "2019WANY36\t333\t421\t2\t1\t1",
                "2009ZEMD01\t333\t532\t9\t1\t1",
            ]),
        ),
    ]
}

const GOOD_SINGLES: &[&str] = &[
    "2019WANY36\t333\t347\t3\t1\t1",
    "2009ZEMD01\t333\t316\t1\t1\t1",
    "2009ZEMD01\t333fm\t-1\t0\t0\t0",
    "2015NUNE01\t333\t899\t5000\t300\t2",
];

fn build(dir: &Path, entries: &[(&str, String)]) -> Result<CommitResult, LoadError> {
    let archive = dir.join("export.zip");
    write_zip(&archive, entries);
    Loader::new(dir.join("wca.db")).build_store(&archive, &ExportStamp::default(), Some(&SilentProgress))
}

#[test]
fn builds_store_from_current_layout() {
    let dir = tempfile::tempdir().unwrap();
    let result = build(dir.path(), &current_layout(GOOD_SINGLES)).unwrap();

    assert_eq!(result.stats.persons, 3);
    assert_eq!(result.stats.skipped_persons, 1);
    assert_eq!(result.stats.events, 2);
    assert_eq!(result.stats.single_rows, 4);
    assert_eq!(result.stats.average_rows, 2);
    assert_eq!(result.export_date.as_deref(), Some("2026-10-15T00:00:12Z"));
    assert!(!dir.path().join("wca.db.building").exists());

    let conn = open_readonly(&result.store_path).unwrap();
    let wang = find_person_by_id(&conn, "2019WANY36").unwrap().unwrap();
    assert_eq!(wang.name, "Yiheng Wang (王艺衡)");
    assert_eq!(wang.continent_id.as_deref(), Some("_Asia"));
    assert_eq!(wang.gender, Some(Gender::Male));

    let meta = metadata(&conn).unwrap();
    assert_eq!(meta.get("format_version").map(String::as_str), Some("2.0.0"));
    assert!(meta.contains_key("built_at"));
}

#[test]
fn dnf_and_ranks_survive_loading() {
    let dir = tempfile::tempdir().unwrap();
    let result = build(dir.path(), &current_layout(GOOD_SINGLES)).unwrap();
    let conn = open_readonly(&result.store_path).unwrap();

    let results = results_for_person(&conn, "2009ZEMD01").unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].event_id, "333");
    assert_eq!(results[0].single, Some(Mark::Finite(316)));
    assert_eq!(results[0].average, Some(Mark::Finite(532)));
    assert_eq!(results[0].single_ranks.world, Some(1));
    assert_eq!(results[1].single, Some(Mark::Dnf));
    assert_eq!(results[1].single_ranks.world, None);
    assert_eq!(results[1].average, None);
}

#[test]
fn missing_continent_falls_back_to_iso2() {
    let dir = tempfile::tempdir().unwrap();
    let result = build(dir.path(), &current_layout(GOOD_SINGLES)).unwrap();
    let conn = open_readonly(&result.store_path).unwrap();
    let p = find_person_by_id(&conn, "2015NUNE01").unwrap().unwrap();
    assert_eq!(p.continent_id.as_deref(), Some("_South America"));
    assert_eq!(p.gender, None);
}

#[test]
fn legacy_layout_loads() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![
        (
            "WCA_export_Countries.tsv",
            tsv(&["id\tname\tcontinentId\tiso2", "China\tChina\t_Asia\tCN"]),
        ),
        (
            "WCA_export_Events.tsv",
            tsv(&["id\tname\trank\tformat\tcellName", "333\t3x3x3 Cube\t10\ttime\t3x3x3"]),
        ),
        (
            "WCA_export_Persons.tsv",
            tsv(&["id\tsubid\tname\tcountryId\tgender", "2019WANY36\t1\tYiheng Wang (王艺衡)\tChina\tm"]),
        ),
        (
            "WCA_export_RanksSingle.tsv",
            tsv(&[
                "personId\teventId\tbest\tworldRank\tcontinentRank\tcountryRank",
                "2019WANY36\t333\t347\t3\t1\t1",
            ]),
        ),
        (
            "WCA_export_RanksAverage.tsv",
            tsv(&["personId\teventId\tbest\tworldRank\tcontinentRank\tcountryRank"]),
        ),
    ];
    let result = build(dir.path(), &entries).unwrap();
    assert_eq!(result.stats.persons, 1);
    assert_eq!(result.export_date, None);

    let conn = open_readonly(&result.store_path).unwrap();
    let results = results_for_person(&conn, "2019WANY36").unwrap();
    assert_eq!(results[0].single, Some(Mark::Finite(347)));
    let wang = find_person_by_id(&conn, "2019WANY36").unwrap().unwrap();
    assert_eq!(wang.gender, Some(Gender::Male));
}

#[test]
fn stamp_overrides_archive_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("export.zip");
    write_zip(&archive, &current_layout(GOOD_SINGLES));
    let stamp = ExportStamp {
        export_date: Some("2026-10-16T00:00:00Z".to_string()),
        format_version: None,
    };
    let result = Loader::new(dir.path().join("wca.db"))
        .build_store(&archive, &stamp, None)
        .unwrap();
    assert_eq!(result.export_date.as_deref(), Some("2026-10-16T00:00:00Z"));
    assert_eq!(result.format_version.as_deref(), Some("2.0.0"));
}

#[test]
fn parse_error_leaves_live_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let result = build(dir.path(), &current_layout(GOOD_SINGLES)).unwrap();
    let before = std::fs::read(&result.store_path).unwrap();

    let broken = [
        "2019WANY36\t333\t347\t3\t1\t1",
        "2009ZEMD01\t333\tfast\t1\t1\t1",
    ];
    let err = build(dir.path(), &current_layout(&broken)).unwrap_err();
    match err {
        LoadError::Parse { table, line, .. } => {
            assert_eq!(table, "ranks_single");
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(std::fs::read(&result.store_path).unwrap(), before);
    assert!(!dir.path().join("wca.db.building").exists());
}

#[test]
fn short_row_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = build(dir.path(), &current_layout(&["2019WANY36\t333"])).unwrap_err();
    assert!(matches!(err, LoadError::Parse { ref table, .. } if table == "ranks_single"));
    assert!(!dir.path().join("wca.db").exists());
}

#[test]
fn missing_table_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let entries: Vec<_> = current_layout(GOOD_SINGLES)
        .into_iter()
        .filter(|(name, _)| *name != "ranks_average.tsv")
        .collect();
    let err = build(dir.path(), &entries).unwrap_err();
    assert!(matches!(err, LoadError::SchemaMismatch { ref table, .. } if table == "ranks_average"));
    assert!(!dir.path().join("wca.db").exists());
}

#[test]
fn missing_column_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = current_layout(GOOD_SINGLES);
    for (name, body) in entries.iter_mut() {
        if *name == "events.tsv" {
            *body = tsv(&["id\tname\tformat", "333\t3x3x3 Cube\ttime"]);
        }
    }
    let err = build(dir.path(), &entries).unwrap_err();
    match err {
        LoadError::SchemaMismatch { table, detail } => {
            assert_eq!(table, "events");
            assert!(detail.contains("rank"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn archive_without_persons_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = current_layout(&[]);
    for (name, body) in entries.iter_mut() {
        if *name == "persons.tsv" {
            *body = tsv(&["name\tgender\twca_id\tsub_id\tcountry_id"]);
        }
    }
    let err = build(dir.path(), &entries).unwrap_err();
    assert!(matches!(err, LoadError::Schema(_)));
    assert!(!dir.path().join("wca.db").exists());
}
