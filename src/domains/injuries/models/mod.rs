mod injury;

pub use injury::*;
