//! Random table names, for tables the server creates on a user's behalf.

use rand::seq::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "ancient", "bold", "brave", "bright", "calm", "clever", "cosmic", "crimson", "daring",
    "eager", "fancy", "gentle", "golden", "happy", "hidden", "jolly", "lucky", "mellow",
    "misty", "noble", "quiet", "rapid", "silent", "swift", "velvet", "wild",
];

const NOUNS: &[&str] = &[
    "badger", "comet", "dragon", "falcon", "forest", "galaxy", "harbor", "lantern", "meadow",
    "nebula", "otter", "phoenix", "pirate", "raven", "river", "rocket", "sparrow", "summit",
    "thunder", "tiger", "voyage", "walrus", "willow", "wizard",
];

/// Joins a random adjective and a random noun, e.g. `"misty falcon"`.
pub fn generate_table_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("nameless");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("table");
    format!("{adjective} {noun}")
}
