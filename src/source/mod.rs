pub mod base;
pub mod invidious;
pub mod streams;
pub mod videoinfo;
pub mod youtube;
