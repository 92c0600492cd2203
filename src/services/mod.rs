pub mod intake;
pub mod output_selection;
