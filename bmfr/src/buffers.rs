mod block_buffer;
mod double_buffered;
mod texture;

pub use self::block_buffer::*;
pub use self::double_buffered::*;
pub use self::texture::*;
