use rand::seq::SliceRandom;
use rand::Rng;

const WORDS: &[&str] = &[
    "apple", "banana", "blueberry", "cherry", "grape", "mango", "orange", "pear", "pineapple",
    "raspberry", "strawberry", "watermelon",
];

pub fn random_word() -> String {
    let mut rng = rand::thread_rng();
    WORDS.choose(&mut rng).copied().unwrap_or("apple").to_string()
}

pub fn random_key() -> String {
    let n: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{}", random_word(), n)
}
