pub mod filenames;
