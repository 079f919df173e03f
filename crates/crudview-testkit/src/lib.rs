// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crudview_app::{
    ConfirmPrompt, ConfirmRequest, ConfirmResponse, Field, FieldValue, MemoryCollection, Model,
    RecordData, Schema, Shared, Validation, record_data, shared,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use time::{Date, Duration, Month};

pub const PEOPLE_COLLECTION_ID: &str = "people";
pub const PERSON_TYPE_NAME: &str = "Person";

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "example.org",
    "mail.test",
    "inbox.test",
    "corp.example",
];

const REFERENCE_YEAR: i32 = 2026;

/// `id` (identifier), `firstName`, `age`.
pub fn basic_people_schema() -> Schema {
    Schema::new(vec![
        Field::integer("id"),
        Field::text("firstName"),
        Field::integer("age"),
    ])
    .with_id_field("id")
}

/// A schema touching every editor kind.
pub fn people_schema() -> Schema {
    Schema::new(vec![
        Field::integer("id"),
        Field::text("firstName"),
        Field::text("lastName"),
        Field::integer("age"),
        Field::text("email"),
        Field::boolean("active"),
        Field::date("birthday"),
    ])
    .with_id_field("id")
}

/// [`people_schema`] with a required first name and a well-formed email.
pub fn validated_people_model() -> Model {
    Model::new(people_schema()).with_validations(vec![
        Validation::presence("firstName"),
        Validation::email("email"),
    ])
}

pub fn people_collection(model: Model) -> Shared<MemoryCollection> {
    shared(MemoryCollection::new(PERSON_TYPE_NAME, model).with_id(PEOPLE_COLLECTION_ID))
}

/// A `people` collection over [`people_schema`] holding `count` generated people.
pub fn seeded_people(seed: u64, count: usize) -> Shared<MemoryCollection> {
    let collection = people_collection(Model::new(people_schema()));
    let mut faker = PeopleFaker::new(seed);
    for _ in 0..count {
        collection.borrow_mut().insert(faker.person().to_data());
    }
    collection
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub email: String,
    pub active: bool,
    pub birthday: Date,
}

impl Person {
    pub fn to_data(&self) -> RecordData {
        record_data([
            ("firstName", FieldValue::from(self.first_name.as_str())),
            ("lastName", FieldValue::from(self.last_name.as_str())),
            ("age", FieldValue::Int(self.age)),
            ("email", FieldValue::from(self.email.as_str())),
            ("active", FieldValue::Bool(self.active)),
            ("birthday", FieldValue::Date(self.birthday)),
        ])
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Reproducible people: the same seed always yields the same sequence.
#[derive(Debug, Clone)]
pub struct PeopleFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl PeopleFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn person(&mut self) -> Person {
        let first_name = self.pick(&FIRST_NAMES).to_owned();
        let last_name = self.pick(&LAST_NAMES).to_owned();
        let age = self.int_range(18, 90);
        let email = format!(
            "{}.{}@{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            self.pick(&EMAIL_DOMAINS)
        );
        let born = REFERENCE_YEAR - age as i32;
        let birthday = Date::from_calendar_date(born, Month::January, 1).expect("valid calendar date")
            + Duration::days(self.int_range(0, 364));

        Person {
            first_name,
            last_name,
            age,
            email,
            active: self.rng.bool(),
            birthday,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// Confirmation prompt that replays scripted answers in order. `None` defers
/// like a dialog still on screen; running out of answers defers too.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<ConfirmResponse>>,
    asked: Vec<ConfirmRequest>,
}

impl ScriptedPrompt {
    pub fn answering(answers: impl IntoIterator<Item = Option<ConfirmResponse>>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn yes() -> Self {
        Self::answering([Some(ConfirmResponse::Yes)])
    }

    pub fn no() -> Self {
        Self::answering([Some(ConfirmResponse::No)])
    }

    pub fn asked(&self) -> &[ConfirmRequest] {
        &self.asked
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&mut self, request: &ConfirmRequest) -> Option<ConfirmResponse> {
        self.asked.push(request.clone());
        self.answers.pop_front().flatten()
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}
