mod common;
mod lesson;
mod repository;
