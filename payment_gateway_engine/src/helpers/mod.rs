mod id_generator;

pub use id_generator::{random_id, ID_SUFFIX_LEN, MAX_ID_ATTEMPTS};
