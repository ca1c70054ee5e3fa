pub mod gem_match;

pub use gem_match::GemMatch;
