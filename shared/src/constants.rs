pub const NO_CANDIDATES_ERROR: &str = "No candidates are loaded yet";
pub const SPIN_IN_PROGRESS_ERROR: &str = "The wheel is already spinning";
pub const LOAD_FAILURE_ERROR: &str = "Could not load the candidate list";
pub const SEGMENT_MISMATCH_ERROR: &str = "Wheel segments and candidate pool are out of sync";

pub const DEFAULT_CANDIDATES_FILE: &str = "cocktails.json";
