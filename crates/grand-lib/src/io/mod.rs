pub mod erp;

pub use erp::{
    save_recording, GroupSource, JsonStore, MemoryStore, RecordingStore, RECORDING_EXTENSION,
};
