mod activation;
mod common;
mod event_loop;
mod faults;
mod lifecycle;
mod postures;
