pub mod panic_guard;
