pub mod intake_normalization;
