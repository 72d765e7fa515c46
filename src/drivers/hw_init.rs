//! One-shot hardware peripheral initialization.
//!
//! Configures ADC channels, GPIO directions, the RS-485 UART, the I²C
//! master and the SPI bus using raw ESP-IDF sys calls.  Called once from
//! `main()` before the polling loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
use log::info;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    UartInitFailed(i32),
    I2cInitFailed(i32),
    SpiInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART init failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C master init failed (rc={})", rc),
            Self::SpiInitFailed(rc) => write!(f, "SPI bus init failed (rc={})", rc),
        }
    }
}

/// UART port carrying the RS-485 telemetry link.
#[cfg(target_os = "espidf")]
const RS485_UART: uart_port_t = 1;
/// I²C port for the board environmental sensor.
#[cfg(target_os = "espidf")]
const ENV_I2C_PORT: i32 = 0;
/// Bus timeout for sensor transactions.
#[cfg(target_os = "espidf")]
const BUS_TIMEOUT_TICKS: u32 = 20;

#[cfg(target_os = "espidf")]
pub fn init_peripherals(telemetry_baud: u32) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the polling loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_uart(telemetry_baud)?;
        init_i2c()?;
        init_spi()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_telemetry_baud: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot, 10-bit) ─────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the polling loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 10-bit width: the set-point pots are calibrated against a 1023-count
    // full scale.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_10,
    };

    for &channel in &pins::SETPOINT_ADC_CHANNELS {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured (4 set-point channels, 10-bit)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let input_pins = [pins::LEAK_CONTINUITY_GPIO, pins::LEAK_DETECT_GPIO];

    for &pin in &input_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::WARNING_LINE_GPIO,
        pins::ERROR_LINE_GPIO,
        pins::CYCLE_MARKER_GPIO,
        pins::RS485_DE_GPIO,
        pins::RS485_RE_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    // Transceiver direction control: drive DE and /RE high once and leave
    // them there — the link transmits for the process lifetime.
    unsafe {
        gpio_set_level(pins::RS485_DE_GPIO, 1);
        gpio_set_level(pins::RS485_RE_GPIO, 1);
    }

    info!("hw_init: GPIO outputs configured (RS-485 held transmit-enabled)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── UART (RS-485 telemetry link) ──────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_uart(baud: u32) -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: baud as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };

    unsafe {
        let ret = uart_param_config(RS485_UART, &cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::UartInitFailed(ret));
        }

        let ret = uart_set_pin(
            RS485_UART,
            pins::RS485_TX_GPIO,
            pins::RS485_RX_GPIO,
            -1,
            -1,
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::UartInitFailed(ret));
        }

        // RX buffer must satisfy the driver's minimum even though the
        // receive path is unused on this link.
        let ret = uart_driver_install(RS485_UART, 256, 256, 0, core::ptr::null_mut(), 0);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::UartInitFailed(ret));
        }
    }

    info!("hw_init: UART1 configured ({} baud, 8N1)", baud);
    Ok(())
}

/// Write bytes to the telemetry UART.  Returns the number accepted by the
/// driver, or a negative ESP-IDF error code.
#[cfg(target_os = "espidf")]
pub fn uart_write(data: &[u8]) -> i32 {
    // SAFETY: the UART driver was installed in init_uart(); uart_write_bytes
    // copies out of `data` before returning. Main-loop only.
    unsafe {
        uart_write_bytes(
            RS485_UART,
            data.as_ptr() as *const core::ffi::c_void,
            data.len(),
        )
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_write(data: &[u8]) -> i32 {
    data.len() as i32
}

// ── I²C master (board environmental sensor) ───────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let cfg = i2c_config_t {
        mode: i2c_mode_t_I2C_MODE_MASTER,
        sda_io_num: pins::I2C_SDA_GPIO,
        scl_io_num: pins::I2C_SCL_GPIO,
        sda_pullup_en: true,
        scl_pullup_en: true,
        __bindgen_anon_1: i2c_config_t__bindgen_ty_1 {
            master: i2c_config_t__bindgen_ty_1__bindgen_ty_1 { clk_speed: 100_000 },
        },
        ..Default::default()
    };

    unsafe {
        let ret = i2c_param_config(ENV_I2C_PORT, &cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::I2cInitFailed(ret));
        }
        let ret = i2c_driver_install(ENV_I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::I2cInitFailed(ret));
        }
    }

    info!("hw_init: I2C master configured (100 kHz)");
    Ok(())
}

/// Write `cmd` then read `reply.len()` bytes from a device on the sensor
/// I²C bus.
#[cfg(target_os = "espidf")]
pub fn i2c_write_read(addr: u8, cmd: &[u8], reply: &mut [u8]) -> Result<(), SensorError> {
    // SAFETY: the I2C driver was installed in init_i2c(); buffers outlive
    // the blocking call. Main-loop only.
    let ret = unsafe {
        i2c_master_write_read_device(
            ENV_I2C_PORT,
            addr,
            cmd.as_ptr(),
            cmd.len(),
            reply.as_mut_ptr(),
            reply.len(),
            BUS_TIMEOUT_TICKS,
        )
    };
    if ret != ESP_OK as i32 {
        return Err(SensorError::I2cReadFailed);
    }
    Ok(())
}

// ── SPI bus (RTD probe amplifiers) ────────────────────────────

#[cfg(target_os = "espidf")]
static mut SPI_HANDLES: [spi_device_handle_t; pins::PROBE_CS_GPIOS.len()] =
    [core::ptr::null_mut(); pins::PROBE_CS_GPIOS.len()];

#[cfg(target_os = "espidf")]
unsafe fn init_spi() -> Result<(), HwInitError> {
    let bus_cfg = spi_bus_config_t {
        __bindgen_anon_1: spi_bus_config_t__bindgen_ty_1 {
            mosi_io_num: pins::SPI_MOSI_GPIO,
        },
        __bindgen_anon_2: spi_bus_config_t__bindgen_ty_2 {
            miso_io_num: pins::SPI_MISO_GPIO,
        },
        sclk_io_num: pins::SPI_SCLK_GPIO,
        __bindgen_anon_3: spi_bus_config_t__bindgen_ty_3 { quadwp_io_num: -1 },
        __bindgen_anon_4: spi_bus_config_t__bindgen_ty_4 { quadhd_io_num: -1 },
        ..Default::default()
    };

    unsafe {
        let ret = spi_bus_initialize(
            spi_host_device_t_SPI2_HOST,
            &bus_cfg,
            spi_common_dma_t_SPI_DMA_DISABLED,
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::SpiInitFailed(ret));
        }

        for (idx, &cs) in pins::PROBE_CS_GPIOS.iter().enumerate() {
            // Mode 1 (CPOL=0, CPHA=1) per the amplifier datasheet.
            let dev_cfg = spi_device_interface_config_t {
                mode: 1,
                clock_speed_hz: 1_000_000,
                spics_io_num: cs,
                queue_size: 1,
                ..Default::default()
            };
            let ret = spi_bus_add_device(
                spi_host_device_t_SPI2_HOST,
                &dev_cfg,
                &raw mut SPI_HANDLES[idx],
            );
            if ret != ESP_OK as i32 {
                return Err(HwInitError::SpiInitFailed(ret));
            }
        }
    }

    info!("hw_init: SPI2 configured ({} RTD devices)", pins::PROBE_CS_GPIOS.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
fn spi_handle_for(cs_gpio: i32) -> Option<spi_device_handle_t> {
    pins::PROBE_CS_GPIOS
        .iter()
        .position(|&cs| cs == cs_gpio)
        // SAFETY: SPI_HANDLES is written once during init_spi(); main-loop
        // reads only.
        .map(|idx| unsafe { SPI_HANDLES[idx] })
}

#[cfg(target_os = "espidf")]
fn spi_transfer(cs_gpio: i32, tx: &[u8], rx: &mut [u8]) -> Result<(), SensorError> {
    debug_assert_eq!(tx.len(), rx.len());
    let handle = spi_handle_for(cs_gpio).ok_or(SensorError::SpiReadFailed)?;

    let mut txn = spi_transaction_t {
        length: tx.len() * 8,
        __bindgen_anon_1: spi_transaction_t__bindgen_ty_1 {
            tx_buffer: tx.as_ptr() as *const core::ffi::c_void,
        },
        __bindgen_anon_2: spi_transaction_t__bindgen_ty_2 {
            rx_buffer: rx.as_mut_ptr() as *mut core::ffi::c_void,
        },
        ..Default::default()
    };

    // SAFETY: handle was created in init_spi(); buffers outlive the
    // blocking transmit. Main-loop only.
    let ret = unsafe { spi_device_transmit(handle, &mut txn) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::SpiReadFailed);
    }
    Ok(())
}

/// Read consecutive registers starting at `start_reg` from an RTD amplifier.
#[cfg(target_os = "espidf")]
pub fn spi_read_regs(cs_gpio: i32, start_reg: u8, out: &mut [u8]) -> Result<(), SensorError> {
    let mut tx = [0u8; 8];
    let mut rx = [0u8; 8];
    let len = out.len() + 1;
    debug_assert!(len <= tx.len());

    // Read transactions keep the register address's top bit clear.
    tx[0] = start_reg & 0x7F;
    spi_transfer(cs_gpio, &tx[..len], &mut rx[..len])?;
    out.copy_from_slice(&rx[1..len]);
    Ok(())
}

/// Write one register on an RTD amplifier.
#[cfg(target_os = "espidf")]
pub fn spi_write_reg(cs_gpio: i32, reg: u8, value: u8) -> Result<(), SensorError> {
    let tx = [reg | 0x80, value];
    let mut rx = [0u8; 2];
    spi_transfer(cs_gpio, &tx, &mut rx)
}
