use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;

use super::Source;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    source: Source,
}

impl CheckArgs {
    pub fn handle(&self) -> Result<()> {
        let mut failed = 0usize;
        for (name, bytes) in self.source.load()? {
            let result = tf_pcf::decode(&bytes).and_then(|graph| {
                let encoded = tf_pcf::encode(&graph)?;
                let decoded = tf_pcf::decode(&encoded)?;
                Ok((graph == decoded, encoded.len()))
            });

            match result {
                Ok((true, size)) => println!(
                    "✅ {} {} → {} bytes",
                    name,
                    bytes.len(),
                    size.green()
                ),
                Ok((false, _)) => {
                    failed += 1;
                    println!("❌ {}: graph changed after re-encoding", name.red());
                }
                Err(err) => {
                    failed += 1;
                    println!("❌ {}: {}", name.red(), err);
                }
            }
        }

        if failed > 0 {
            return Err(miette!("{failed} particle files failed the round trip"));
        }
        Ok(())
    }
}
