use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-check-cfg=cfg(bare_metal)");

    // 1. Alvos ARM Cortex-M (RP2040/RP2350) rodam sem sistema operacional:
    //    o loop de strobe nunca deve ter limite de iterações.
    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("thumbv") {
        println!("cargo:rustc-cfg=bare_metal");
    }

    // 2. Permite forçar o modo bare metal no host (ex: medir o loop sem limite)
    if env::var_os("MULTIROM_BARE_METAL").is_some() {
        println!("cargo:rustc-cfg=bare_metal");
    }
    println!("cargo:rerun-if-env-changed=MULTIROM_BARE_METAL");
}
