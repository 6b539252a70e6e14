mod bootstrapper;
mod context;
mod lib_path;
