#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use hal::{
    self,
    adc::Adc,
    clocks::Clocks,
    dma,
    dma::{Dma, DmaChannel, DmaInput, DmaInterrupt, DmaPeriph},
    pac,
    pac::{ADC1, DMA1},
};

use packspoof_algo::{
    config::{StackSelection, StrategySelection, DEFAULT_MCME_OFFSET_VOLTS},
    ConfigError, SpoofConfig, SpoofController,
};
use packspoof_drivers::analog::{ADC1_SEQUENCE, SAMPLING_COUNT};

use cortex_m;

mod board;

const STACK: StackSelection = StackSelection {
    small: cfg!(feature = "stack-48s"),
    large: cfg!(feature = "stack-60s"),
};

const STRATEGY: StrategySelection = StrategySelection {
    pass_true_voltage: cfg!(feature = "spoof-disable"),
    assist_only_variable: cfg!(feature = "spoof-assist-only-variable"),
    assist_only_binary: cfg!(feature = "spoof-assist-only-binary"),
    assist_and_regen: cfg!(feature = "spoof-assist-and-regen"),
};

// Evaluated at build time: a bad feature selection fails compilation
const SPOOF_CONFIG: SpoofConfig =
    match SpoofConfig::from_selection(STACK, STRATEGY, DEFAULT_MCME_OFFSET_VOLTS) {
        Ok(config) => config,
        Err(ConfigError::NoStrategySelected) => panic!("enable one spoof-* feature"),
        Err(ConfigError::MultipleStrategiesSelected(_)) => {
            panic!("more than one spoof-* feature enabled")
        }
        Err(ConfigError::NoStackSelected) => panic!("enable stack-48s or stack-60s"),
        Err(ConfigError::MultipleStacksSelected) => {
            panic!("stack-48s and stack-60s are mutually exclusive")
        }
    };

/// Spoof PWM carrier, filtered down to DC on the board [Hz]
const PWM_FREQ: u32 = 20_000;
/// Scheduler tick [ms]
const TICK_PERIOD_MS: u32 = 10;

static mut ADC_READ_BUF: [u16; SAMPLING_COUNT] = [0; SAMPLING_COUNT];

#[rtic::app(device = pac, peripherals = true)]
mod app {
    use super::*;

    use super::board::Board;
    use packspoof_drivers::{
        analog,
        gpio::{EnableLines, KeyInput},
        pwm::SpoofPwm,
        timer::TickTimer,
    };

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        tick_timer: TickTimer,
        controller: SpoofController,
        board: Board,
        dma1: Dma<DMA1>,
        adc1: Adc<ADC1>,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        if clock_cfg.setup().is_err() {
            defmt::panic!("SYSTEM: clock setup failed");
        }

        let sysclk_freq = clock_cfg.sysclk(); // System clock frequency in Hz
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);

        // Every enable line starts low until the key is confirmed on
        let lines = EnableLines::new();
        let key = KeyInput::new();

        let mut pwm = SpoofPwm::new(dp.TIM2, &clock_cfg, PWM_FREQ);
        pwm.begin();

        let dma1 = Dma::new(dp.DMA1);
        dma::enable_mux1();
        dma::mux(DmaPeriph::Dma1, DmaChannel::C1, DmaInput::Adc1);

        let adc1 = analog::init_adc1(dp.ADC1, &clock_cfg);

        let controller = SpoofController::new(SPOOF_CONFIG);
        let board = Board::new(pwm, key, lines);

        let tick_timer = TickTimer::new(dp.TIM3, &clock_cfg, TICK_PERIOD_MS);
        defmt::info!("SYSTEM: tick every {} ms", TICK_PERIOD_MS);

        (
            Shared {},
            Local {
                tick_timer,
                controller,
                board,
                dma1,
                adc1,
            },
        )
    }

    #[task(binds = TIM3, local = [tick_timer, controller, board, adc1])]
    fn scheduler_tick(cx: scheduler_tick::Context) {
        let now_ms = cx.local.tick_timer.on_update();

        // Samples from the previous tick's conversion
        cx.local.board.latch_adc(unsafe { ADC_READ_BUF });

        if let Some(event) = cx.local.controller.tick(now_ms, cx.local.board) {
            defmt::info!(
                "SYSTEM: key {} at {} ms, BATTSCI {}V",
                event,
                now_ms,
                cx.local.board.battsci_pack_volts()
            );
        }

        // Start ADC DMA reading for the next tick
        unsafe {
            cx.local.adc1.read_dma(
                &mut ADC_READ_BUF,
                &ADC1_SEQUENCE,
                DmaChannel::C1,
                Default::default(),
                DmaPeriph::Dma1,
            )
        };
    }

    #[task(binds = DMA1_CH1, local = [dma1], priority = 1)]
    fn adc_end_read(cx: adc_end_read::Context) {
        dma::clear_interrupt(
            DmaPeriph::Dma1,
            DmaChannel::C1,
            DmaInterrupt::TransferComplete,
        );
        cx.local.dma1.stop(DmaChannel::C1);
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
