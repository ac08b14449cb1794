//! Repository Layer
//!
//! Collaborator abstractions and implementations.

mod memory;
mod rest;
mod traits;


pub use memory::{
    MemoryImageStore, MemoryPartRepository, ScriptedCaptureDevice, ScriptedSpeechSource,
};
pub use rest::{RestImageStore, RestPartRepository};
pub use traits::{
    CaptureDevice, CapturedImage, CollectionEvent, ImageStore, PartRepository, SpeechEvent,
    SpeechSource,
};
