mod config;
mod lockout;
mod wizard;
