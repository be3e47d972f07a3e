#[cfg(feature = "std")]
mod shared;
mod wrap;
