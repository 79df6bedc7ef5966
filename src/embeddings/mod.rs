// Embedding handling: decoding stored vectors and the vector math on top.

pub mod codec;
pub mod vector;
