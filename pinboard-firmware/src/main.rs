//! Pinboard - Blue Pill bring-up firmware
//!
//! Brings the clock tree up, opens the debug console, then binds and
//! configures every declared pin resource in order. Any failure there
//! halts the board. Once all resources are ready it runs a short GPIO
//! loopback test and blinks the on-board LED forever.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::usart::Uart;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use pinboard_core::board::blue_pill::{self, BluePillPin, BluePillRegistry};
use pinboard_hal::gpio::Level;
use pinboard_hal::uart::NullTx;
use pinboard_hal_stm32f1::uart::debug_config;
use pinboard_hal_stm32f1::{bank_pins, clock, DebugUart, PinBank, Stm32f1Driver};

use crate::config::{BlinkConfig, IoTestConfig, FIRMWARE_CONFIG};
use crate::debug::{Console, DebugSink};

mod config;
mod debug;

type Board = BluePillRegistry<Stm32f1Driver>;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pinboard firmware starting...");
    let config = FIRMWARE_CONFIG;

    let rcc = match clock::config(&config.clock) {
        Ok(rcc) => rcc,
        Err(e) => {
            error!("Clock configuration rejected: {}", e);
            halt();
        }
    };
    let p = embassy_stm32::init(rcc);
    info!("Clock running at {} Hz", config.clock.sysclk_hz);

    // Debug output is optional; a UART setup failure only loses the text log
    let sink = if config.debug.enabled {
        match Uart::new_blocking(p.USART1, p.PA10, p.PA9, debug_config(config.debug.baudrate)) {
            Ok(uart) => DebugSink::Uart(DebugUart::new(uart)),
            Err(_) => {
                warn!("Debug UART unavailable, continuing without it");
                DebugSink::Off(NullTx)
            }
        }
    } else {
        DebugSink::Off(NullTx)
    };
    let mut console = Console::new(sink);
    console.line(format_args!("Pinboard starting"));

    // PA9/PA10 belong to the debug UART, PA13/PA14 to SWD
    let mut bank = PinBank::new();
    bank_pins!(
        bank, p, PA0, PA1, PA2, PA3, PA4, PA5, PA6, PA7, PA8, PA11, PA12, PA15, PB0, PB1, PB2,
        PB3, PB4, PB5, PB6, PB7, PB8, PB9, PB10, PB11, PB12, PB13, PB14, PB15, PC13, PC14, PC15,
    );

    let mut board: Board = match blue_pill::registry(Stm32f1Driver::new(bank)) {
        Ok(board) => board,
        Err(e) => {
            let msg = console.line(format_args!("Resource table invalid: {}", e));
            error!("{}", msg.as_str());
            halt();
        }
    };

    if let Err(e) = board.initialize_all() {
        let msg = console.line(format_args!("Platform init failed: {}", e));
        error!("{}", msg.as_str());
        console.flush();
        halt();
    }

    info!("All pin resources configured");
    console.line(format_args!("Platform init OK"));

    io_test(&mut board, &mut console, &config.io_test).await;
    blink(&mut board, &mut console, &config.blink).await;
}

/// Toggle the debug output and sample the test input
async fn io_test(board: &mut Board, console: &mut Console, config: &IoTestConfig) {
    for cycle in 0..config.cycles {
        if let Err(e) = board.set_level(BluePillPin::DebugOutput, Level::High) {
            warn!("I/O test: drive high failed: {}", e);
        }
        Timer::after_millis(config.period_ms.into()).await;

        match board.level(BluePillPin::TestInput) {
            Ok(level) => {
                debug!("I/O test cycle {}: input {}", cycle, level);
            }
            Err(e) => {
                let msg = console.line(format_args!("I/O test: read failed: {}", e));
                warn!("{}", msg.as_str());
            }
        }

        if let Err(e) = board.set_level(BluePillPin::DebugOutput, Level::Low) {
            warn!("I/O test: drive low failed: {}", e);
        }
        Timer::after_millis(config.period_ms.into()).await;
    }
    console.line(format_args!("I/O test done ({} cycles)", config.cycles));
}

/// Blink the on-board LED forever
async fn blink(board: &mut Board, console: &mut Console, config: &BlinkConfig) -> ! {
    loop {
        match board.toggle(BluePillPin::LedBuiltin) {
            Ok(Level::High) => {
                console.line(format_args!("LED HIGH"));
            }
            Ok(Level::Low) => {
                console.line(format_args!("LED LOW"));
            }
            Err(e) => {
                warn!("LED toggle failed: {}", e);
            }
        }
        Timer::after_millis(config.period_ms.into()).await;
    }
}

/// Stop the board after an unrecoverable bring-up failure
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
