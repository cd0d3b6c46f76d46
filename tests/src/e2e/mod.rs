mod cli;
mod spawn_rate;
