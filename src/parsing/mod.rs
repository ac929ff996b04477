pub mod electronic;
pub mod xyz;
