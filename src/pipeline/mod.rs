pub mod controls;
pub mod effect_bank;
pub mod export;
pub mod mixdown;
pub mod permissions;
pub mod persistence;
pub mod player;
pub mod recorder;
pub mod track_store;

#[cfg(test)]
pub mod test_fixture;
