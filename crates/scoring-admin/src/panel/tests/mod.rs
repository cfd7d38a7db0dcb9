mod common;
mod saving;
