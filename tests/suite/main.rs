mod harness;
mod http;
