pub mod addon;
