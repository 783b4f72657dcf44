pub mod window_reaper;
