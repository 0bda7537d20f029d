fn main() {
    slint_build::compile("ui/cvfolio.slint").expect("Slint build failed");
}
