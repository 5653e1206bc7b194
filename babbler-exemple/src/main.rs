use babbler_core::command::{Message, SendReply};
use babbler_core::quotes::FileQuotes;
use babbler_core::store::MemoryStore;
use babbler_core::Babbler;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Prints replies the way a chat client would show them.
struct Console;

impl SendReply for Console {
    fn send_reply(&mut self, channel: &str, text: &str) {
        println!("[{channel}] babbler: {text}");
    }
}

fn chat(babbler: &mut Babbler, user: &str, body: &str) {
    println!("[#demo] {user}: {body}");
    let message = Message { channel: "#demo".to_owned(), user: user.to_owned(), body: body.to_owned() };
    babbler.handle_message(&message, &mut Console);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // In-memory graph; use MemoryStore::open("data/babbler.bin") to keep it between runs.
    // A fixed seed makes every run print the same babble
    let mut babbler = Babbler::new(MemoryStore::new())?
        .with_rng(StdRng::seed_from_u64(2013))
        // Quotes in ./quotes/<name>.txt are learned when a babbler is initialized
        .with_quotes(FileQuotes::new("./quotes"));

    // Anything that is not a command is learned for whoever said it
    chat(&mut babbler, "seabass", "fish are friends not food");
    chat(&mut babbler, "seabass", "fish are tasty");
    chat(&mut babbler, "seabass", "friends are forever");
    chat(&mut babbler, "tuna", "swim fast or sink");
    chat(&mut babbler, "tuna", "fish school together");

    // Generate, with and without a seed
    chat(&mut babbler, "you", "seabass says");
    chat(&mut babbler, "you", "seabass says fish are");

    // Failures are answered, not raised
    chat(&mut babbler, "you", "seabass says whale");
    chat(&mut babbler, "you", "marlin says");

    // Explicit training and initialization
    chat(&mut babbler, "you", "batch learn for marlin deep blue sea\ndeep water");
    chat(&mut babbler, "you", "initialize babbler for marlin");
    chat(&mut babbler, "you", "marlin says deep");

    // Merge tuna into seabass, then seabass can say what tuna said
    chat(&mut babbler, "you", "merge babbler seabass and tuna");
    chat(&mut babbler, "you", "seabass says swim");

    // The engine API is usable without the chat layer too
    for i in 0..5 {
        println!("Generated line {}: {}", i + 1, babbler.babble("seabass")?);
    }

    Ok(())
}
