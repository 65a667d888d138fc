//! Random test data generators using the fake crate
//!
//! Provides realistic random data including:
//! - Task names, descriptions and categories within the allowed character set
//! - Property-based testing strategies for valid and invalid input

use chrono::Utc;
use fake::faker::lorem::en::Words;
use fake::Fake;
use proptest::prelude::*;
use rand::Rng;
use task_core::{Task, TaskInput};

/// Generate a realistic task name
pub fn generate_task_name() -> String {
    let words: Vec<String> = Words(2..5).fake();
    let number: u32 = (1..9999).fake();
    format!("{} {number}", words.join(" "))
}

/// Generate a realistic task description
pub fn generate_task_description() -> String {
    let words: Vec<String> = Words(5..20).fake();
    words.join(" ")
}

/// Generate a category from a realistic pool
pub fn generate_category() -> String {
    let categories = ["Study", "Hobby", "Work", "Home", "Sport", "Учеба"];
    categories[rand::thread_rng().gen_range(0..categories.len())].to_string()
}

/// Generate a random valid request body
pub fn generate_task_input() -> TaskInput {
    let mut rng = rand::thread_rng();
    TaskInput::new(
        generate_task_name(),
        rng.gen_bool(0.7).then(generate_task_description),
        rng.gen_bool(0.5).then(generate_category),
    )
}

/// Generate a random stored task
pub fn generate_random_task() -> Task {
    let id: u32 = (1..99999).fake();
    let input = generate_task_input();
    Task {
        id: id as i64,
        name: input.name,
        description: input.description,
        category: input.category,
        created_at: Utc::now(),
    }
}

/// Proptest strategy for valid task names
pub fn valid_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Zа-яА-ЯёЁ0-9 _]{3,100}"
}

/// Proptest strategy for names with a valid charset but too few characters
pub fn short_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Zа-яА-ЯёЁ0-9 _]{0,2}"
}

/// Proptest strategy for names with a valid charset but too many characters
pub fn long_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Zа-яА-ЯёЁ0-9 _]{101,150}"
}

/// Proptest strategy for a single character outside the allowed set
pub fn forbidden_char_strategy() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("character must be outside the allowed set", |c| {
        !(c.is_ascii_alphanumeric()
            || *c == ' '
            || *c == '_'
            || ('а'..='я').contains(c)
            || ('А'..='Я').contains(c)
            || *c == 'ё'
            || *c == 'Ё')
    })
}

/// Proptest strategy for a valid name with one forbidden character spliced in
pub fn invalid_name_strategy() -> impl Strategy<Value = String> {
    (valid_name_strategy(), forbidden_char_strategy(), any::<prop::sample::Index>()).prop_map(
        |(name, forbidden, index)| {
            let mut chars: Vec<char> = name.chars().collect();
            chars.truncate(99);
            let at = index.index(chars.len() + 1);
            chars.insert(at, forbidden);
            chars.into_iter().collect()
        },
    )
}

/// Proptest strategy for complete valid request bodies
pub fn task_input_strategy() -> impl Strategy<Value = TaskInput> {
    (
        valid_name_strategy(),
        proptest::option::of("[a-zA-Zа-яА-ЯёЁ0-9 _]{1,500}"),
        proptest::option::of("[a-zA-Zа-яА-ЯёЁ0-9 _]{1,100}"),
    )
        .prop_map(|(name, description, category)| TaskInput::new(name, description, category))
}
