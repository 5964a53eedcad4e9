pub mod deidentify;
pub mod inspect;

pub use deidentify::DeidentifyUseCase;
pub use inspect::{InspectContentUseCase, InspectStorageUseCase};
