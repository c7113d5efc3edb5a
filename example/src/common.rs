use std::fs;
use std::path::Path;

pub struct RmGuard<P: AsRef<Path>>(pub P);

impl<P: AsRef<Path>> Drop for RmGuard<P> {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}
