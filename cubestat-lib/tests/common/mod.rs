//! Shared fixture stores for the integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use cubestat_core::{Country, Event, EventFormat, Mark, Person, Ranks};
use cubestat_db::{
    create_indexes, insert_continent, insert_country, insert_event, insert_person, open_database,
    set_metadata, upsert_average, upsert_single,
};
use zip::write::SimpleFileOptions;

pub fn country(id: &str, continent: &str, iso2: &str) -> Country {
    Country {
        id: id.to_string(),
        name: id.to_string(),
        continent_id: continent.to_string(),
        iso2: iso2.to_string(),
    }
}

pub fn person(id: &str, name: &str, country: &str, continent: &str) -> Person {
    Person {
        wca_id: id.to_string(),
        name: name.to_string(),
        country_id: country.to_string(),
        continent_id: Some(continent.to_string()),
        gender: None,
    }
}

fn event(id: &str, name: &str, rank: i64) -> Event {
    Event {
        id: id.to_string(),
        name: name.to_string(),
        rank,
        format: EventFormat::Time,
    }
}

fn ranks(world: u32, continent: u32, country: u32) -> Ranks {
    Ranks {
        world: Some(world),
        continent: Some(continent),
        country: Some(country),
    }
}

/// One person's marks in one event: `(person, event, single, average)`.
pub type Row = (&'static str, &'static str, Option<i64>, Option<i64>);

fn mark(raw: Option<i64>) -> Option<Mark> {
    raw.and_then(Mark::from_raw)
}

/// Write a committed store at `path` holding the standard people plus `rows`.
///
/// People:
/// - `2019SUBJ01` "Subject Person (主角)", China, the nemesis subject
/// - `2018CHIN01` "Chen Hao (陈浩)", China
/// - `2017JAPA01` "Taro Yamada (山田太郎)", Japan
/// - `2016USAA01` "John Smith", USA
/// - `2015WANG01` / `2016WANG02` "Wei Wang (王伟)", China, same name
pub fn write_store(path: &Path, export_date: &str, rows: &[Row]) {
    let conn = open_database(path).unwrap();
    insert_continent(&conn, "_Asia", "Asia").unwrap();
    insert_continent(&conn, "_North America", "North America").unwrap();
    insert_country(&conn, &country("China", "_Asia", "CN")).unwrap();
    insert_country(&conn, &country("Japan", "_Asia", "JP")).unwrap();
    insert_country(&conn, &country("USA", "_North America", "US")).unwrap();
    insert_event(&conn, &event("333", "3x3x3 Cube", 10)).unwrap();
    insert_event(&conn, &event("222", "2x2x2 Cube", 20)).unwrap();
    insert_event(&conn, &event("444", "4x4x4 Cube", 30)).unwrap();

    for p in [
        person("2019SUBJ01", "Subject Person (主角)", "China", "_Asia"),
        person("2018CHIN01", "Chen Hao (陈浩)", "China", "_Asia"),
        person("2017JAPA01", "Taro Yamada (山田太郎)", "Japan", "_Asia"),
        person("2016USAA01", "John Smith", "USA", "_North America"),
        person("2015WANG01", "Wei Wang (王伟)", "China", "_Asia"),
        person("2016WANG02", "Wei Wang (王伟)", "China", "_Asia"),
    ] {
        insert_person(&conn, &p).unwrap();
    }

    for (i, (who, what, single, average)) in rows.iter().enumerate() {
        let position = i as u32 + 1;
        if single.is_some() {
            upsert_single(&conn, who, what, mark(*single), ranks(position, position, 1)).unwrap();
        }
        if average.is_some() {
            upsert_average(&conn, who, what, mark(*average), ranks(position * 300, position, 1))
                .unwrap();
        }
    }

    set_metadata(&conn, "export_date", export_date).unwrap();
    set_metadata(&conn, "built_at", "2026-10-18T00:00:00Z").unwrap();
    create_indexes(&conn).unwrap();
}

/// Rows for a subject contesting 333 and 222 with four rivals:
/// - `2018CHIN01` beats the subject on both metrics of both events
/// - `2017JAPA01` beats the subject in 333 and never entered 222
/// - `2016USAA01` beats the subject in 333 but has a slower 222 average
/// - `2015WANG01` only has 444, which the subject never entered
pub const NEMESIS_ROWS: &[Row] = &[
    ("2019SUBJ01", "333", Some(1000), Some(1200)),
    ("2019SUBJ01", "222", Some(400), Some(500)),
    ("2018CHIN01", "333", Some(900), Some(1100)),
    ("2018CHIN01", "222", Some(350), Some(450)),
    ("2017JAPA01", "333", Some(800), Some(1000)),
    ("2016USAA01", "333", Some(700), Some(900)),
    ("2016USAA01", "222", Some(300), Some(600)),
    ("2015WANG01", "444", Some(3000), Some(3500)),
];

/// Write a store of `count` generated people spread over three countries.
///
/// Each person enters each of 333, 222 and 444 with probability 3/4. Marks
/// come from a narrow range so ties are common, and DNFs and missing
/// averages are mixed in. Returns the ids in ascending order.
pub fn write_generated_store(path: &Path, count: usize) -> Vec<String> {
    let conn = open_database(path).unwrap();
    insert_continent(&conn, "_Asia", "Asia").unwrap();
    insert_continent(&conn, "_North America", "North America").unwrap();
    insert_country(&conn, &country("China", "_Asia", "CN")).unwrap();
    insert_country(&conn, &country("Japan", "_Asia", "JP")).unwrap();
    insert_country(&conn, &country("USA", "_North America", "US")).unwrap();
    insert_event(&conn, &event("333", "3x3x3 Cube", 10)).unwrap();
    insert_event(&conn, &event("222", "2x2x2 Cube", 20)).unwrap();
    insert_event(&conn, &event("444", "4x4x4 Cube", 30)).unwrap();

    // xorshift64, fixed seed
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = |bound: u64| -> u64 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state % bound
    };

    let places = [("China", "_Asia"), ("Japan", "_Asia"), ("USA", "_North America")];
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = format!("2020GEN{i:03}");
        let (country_id, continent) = places[next(3) as usize];
        insert_person(&conn, &person(&id, &format!("Generated {i}"), country_id, continent))
            .unwrap();
        for event_id in ["333", "222", "444"] {
            if next(4) == 0 {
                continue;
            }
            let single = if next(8) == 0 {
                Mark::Dnf
            } else {
                Mark::Finite(500 + next(12) as i64 * 10)
            };
            upsert_single(&conn, &id, event_id, Some(single), Ranks::default()).unwrap();
            let average = match next(6) {
                0 => None,
                1 => Some(Mark::Dnf),
                _ => Some(Mark::Finite(600 + next(12) as i64 * 10)),
            };
            if average.is_some() {
                upsert_average(&conn, &id, event_id, average, Ranks::default()).unwrap();
            }
        }
        ids.push(id);
    }

    set_metadata(&conn, "export_date", "2026-10-15T00:00:00Z").unwrap();
    set_metadata(&conn, "built_at", "2026-10-18T00:00:00Z").unwrap();
    create_indexes(&conn).unwrap();
    ids
}

/// Build a zipped export in the current layout for loader-driven tests.
pub fn write_export_zip(path: &Path, export_date: &str, persons: &[&str], singles: &[&str]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let mut person_rows = vec!["name\tgender\twca_id\tsub_id\tcountry_id".to_string()];
    person_rows.extend(persons.iter().map(|s| s.to_string()));
    let mut single_rows =
        vec!["person_id\tevent_id\tbest\tworld_rank\tcontinent_rank\tcountry_rank".to_string()];
    single_rows.extend(singles.iter().map(|s| s.to_string()));

    let entries = [
        (
            "metadata.json",
            format!(r#"{{"export_date":"{export_date}","export_format_version":"2.0.0"}}"#),
        ),
        ("continents.tsv", "id\tname\n_Asia\tAsia\n".to_string()),
        (
            "countries.tsv",
            "id\tname\tcontinent_id\tiso2\nChina\tChina\t_Asia\tCN\n".to_string(),
        ),
        ("events.tsv", "id\tname\trank\tformat\n333\t3x3x3 Cube\t10\ttime\n".to_string()),
        ("persons.tsv", person_rows.join("\n") + "\n"),
        ("ranks_single.tsv", single_rows.join("\n") + "\n"),
        (
            "ranks_average.tsv",
            "person_id\tevent_id\tbest\tworld_rank\tcontinent_rank\tcountry_rank\n".to_string(),
        ),
    ];
    for (name, body) in entries {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
