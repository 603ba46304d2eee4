mod hls;
mod parse;
