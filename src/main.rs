fn main() -> Result<(), Box<dyn std::error::Error>> {
    neuroplayer::runtime::run()
}
