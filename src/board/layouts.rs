//! Built-in header layouts.
//!
//! Tables are keyed the way the hardware documents them: names by physical
//! pin, then two directed maps (SoC number to physical, wired number to
//! physical). Reverse translations search these maps; see the numbering
//! module.

use crate::capability::CapabilityMask;

pub(super) struct LayoutData {
    pub names: &'static [(u8, &'static str)],
    pub bcm_to_board: &'static [(u8, u8)],
    pub wired_to_board: &'static [(u8, u8)],
    pub functions: &'static [(CapabilityMask, &'static [u8])],
}

/// 26-pin header, first production run. BCM 0/1 sit on the I2C pins and
/// BCM 21 on physical 13.
pub(super) const LAYOUT_26_R1: LayoutData = LayoutData {
    names: &[
        (1, "3.3v"),
        (2, "5v"),
        (3, "SDA.1"),
        (4, "5v"),
        (5, "SCL.1"),
        (6, "0v"),
        (7, "GPIO. 7"),
        (8, "TxD"),
        (9, "0v"),
        (10, "RxD"),
        (11, "GPIO. 0"),
        (12, "GPIO. 1"),
        (13, "GPIO. 2"),
        (14, "0v"),
        (15, "GPIO. 3"),
        (16, "GPIO. 4"),
        (17, "3.3v"),
        (18, "GPIO. 5"),
        (19, "MOSI"),
        (20, "0v"),
        (21, "MISO"),
        (22, "GPIO. 6"),
        (23, "SCLK"),
        (24, "CE0"),
        (25, "0v"),
        (26, "CE1"),
    ],
    bcm_to_board: &[
        (0, 3),
        (1, 5),
        (4, 7),
        (14, 8),
        (15, 10),
        (17, 11),
        (18, 12),
        (21, 13),
        (22, 15),
        (23, 16),
        (24, 18),
        (10, 19),
        (9, 21),
        (25, 22),
        (11, 23),
        (8, 24),
        (7, 26),
    ],
    wired_to_board: &[
        (0, 11),
        (1, 12),
        (2, 13),
        (3, 15),
        (4, 16),
        (5, 18),
        (6, 22),
        (7, 7),
        (8, 3),
        (9, 5),
        (10, 24),
        (11, 26),
        (12, 19),
        (13, 21),
        (14, 23),
        (15, 8),
        (16, 10),
    ],
    functions: &[
        (CapabilityMask::V3_3, &[1, 17]),
        (CapabilityMask::V5, &[2, 4]),
        (CapabilityMask::GROUND, &[6, 9, 14, 20, 25]),
        (
            CapabilityMask::GPIO,
            &[3, 5, 7, 8, 10, 11, 12, 13, 15, 16, 18, 19, 21, 22, 23, 24, 26],
        ),
        (CapabilityMask::SPI, &[19, 21, 23, 24, 26]),
        (CapabilityMask::I2C, &[3, 5]),
        (CapabilityMask::UART, &[8, 10]),
        (CapabilityMask::PWM, &[12]),
    ],
};

/// 26-pin header, second run. Same wired numbering as rev 1; BCM 2/3/27
/// replace 0/1/21.
pub(super) const LAYOUT_26_R2: LayoutData = LayoutData {
    names: LAYOUT_26_R1.names,
    bcm_to_board: &[
        (2, 3),
        (3, 5),
        (4, 7),
        (14, 8),
        (15, 10),
        (17, 11),
        (18, 12),
        (27, 13),
        (22, 15),
        (23, 16),
        (24, 18),
        (10, 19),
        (9, 21),
        (25, 22),
        (11, 23),
        (8, 24),
        (7, 26),
    ],
    wired_to_board: LAYOUT_26_R1.wired_to_board,
    functions: LAYOUT_26_R1.functions,
};

/// 40-pin header carried by every board since the B+.
pub(super) const LAYOUT_40: LayoutData = LayoutData {
    names: &[
        (1, "3.3v"),
        (2, "5v"),
        (3, "SDA.1"),
        (4, "5v"),
        (5, "SCL.1"),
        (6, "0v"),
        (7, "GPIO. 7"),
        (8, "TxD"),
        (9, "0v"),
        (10, "RxD"),
        (11, "GPIO. 0"),
        (12, "GPIO. 1"),
        (13, "GPIO. 2"),
        (14, "0v"),
        (15, "GPIO. 3"),
        (16, "GPIO. 4"),
        (17, "3.3v"),
        (18, "GPIO. 5"),
        (19, "MOSI"),
        (20, "0v"),
        (21, "MISO"),
        (22, "GPIO. 6"),
        (23, "SCLK"),
        (24, "CE0"),
        (25, "0v"),
        (26, "CE1"),
        (27, "SDA.0"),
        (28, "SCL.0"),
        (29, "GPIO.21"),
        (30, "0v"),
        (31, "GPIO.22"),
        (32, "GPIO.26"),
        (33, "GPIO.23"),
        (34, "0v"),
        (35, "GPIO.24"),
        (36, "GPIO.27"),
        (37, "GPIO.25"),
        (38, "GPIO.28"),
        (39, "0v"),
        (40, "GPIO.29"),
    ],
    bcm_to_board: &[
        (2, 3),
        (3, 5),
        (4, 7),
        (14, 8),
        (15, 10),
        (17, 11),
        (18, 12),
        (27, 13),
        (22, 15),
        (23, 16),
        (24, 18),
        (10, 19),
        (9, 21),
        (25, 22),
        (11, 23),
        (8, 24),
        (7, 26),
        (0, 27),
        (1, 28),
        (5, 29),
        (6, 31),
        (12, 32),
        (13, 33),
        (19, 35),
        (16, 36),
        (26, 37),
        (20, 38),
        (21, 40),
    ],
    wired_to_board: &[
        (0, 11),
        (1, 12),
        (2, 13),
        (3, 15),
        (4, 16),
        (5, 18),
        (6, 22),
        (7, 7),
        (8, 3),
        (9, 5),
        (10, 24),
        (11, 26),
        (12, 19),
        (13, 21),
        (14, 23),
        (15, 8),
        (16, 10),
        (21, 29),
        (22, 31),
        (23, 33),
        (24, 35),
        (25, 37),
        (26, 32),
        (27, 36),
        (28, 38),
        (29, 40),
        (30, 27),
        (31, 28),
    ],
    functions: &[
        (CapabilityMask::V3_3, &[1, 17]),
        (CapabilityMask::V5, &[2, 4]),
        (CapabilityMask::GROUND, &[6, 9, 14, 20, 25, 30, 34, 39]),
        (
            CapabilityMask::GPIO,
            &[
                3, 5, 7, 8, 10, 11, 12, 13, 15, 16, 18, 19, 21, 22, 23, 24, 26, 27, 28, 29, 31,
                32, 33, 35, 36, 37, 38, 40,
            ],
        ),
        (CapabilityMask::SPI, &[19, 21, 23, 24, 26]),
        (CapabilityMask::I2C, &[3, 5, 27, 28]),
        (CapabilityMask::UART, &[8, 10]),
        (CapabilityMask::PWM, &[12, 32, 33, 35]),
    ],
};
