// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use qsweep_dsl::{
    FirmwareConfig, HardwareSweep, Instruction, ParameterStore, Protocol, ResolvedHardwareSweep,
    TimeSpec,
};
use qsweep_units::LinearQuantizer;

use crate::directive::{
    Advance, ConfigurePulse, ConfigureReadout, DeclareGenerator, DeclareReadout, Directive,
    RegisterSweep, SchedulePulse, ScheduleTrigger, Settle,
};
use crate::program::{BuiltProgram, ProgramOptions, ReadoutShape, SweepAxis};
use crate::Result;

/// Timing-processor cycles inserted between configuration and the loop body.
const SETTLE_CYCLES: i64 = 200;

/// Quantizes every hardware sweep against the protocol's register bindings.
///
/// A sweep over a parameter with no binding in the capability table is a
/// fatal configuration error, raised here, before any device I/O.
pub fn resolve_sweeps(
    protocol: &Protocol,
    firmware: &FirmwareConfig,
    hardware_sweeps: &[HardwareSweep],
) -> Result<Vec<ResolvedHardwareSweep>> {
    let targets = protocol.sweep_targets(firmware)?;
    hardware_sweeps
        .iter()
        .map(|sweep| {
            let target = targets.get(&sweep.parameter.uid).ok_or_else(|| {
                qsweep_dsl::Error::NoRegisterBinding {
                    name: sweep.parameter.name.clone(),
                }
            })?;
            Ok(sweep.resolve(target.binding, &target.mapper)?)
        })
        .collect()
}

/// Builds a device program for the protocol's instructions and the given
/// hardware sweeps, reading current parameter values from the store.
///
/// The directive order is fixed: channel declarations (generators first, in
/// first-use order), per-instruction configuration in protocol order,
/// register sweeps in reverse declaration order, a settling delay, then the
/// shot body. Nothing here mutates channel or parameter state.
pub fn build(
    protocol: &Protocol,
    store: &ParameterStore,
    firmware: &FirmwareConfig,
    hardware_sweeps: &[HardwareSweep],
    options: &ProgramOptions,
) -> Result<BuiltProgram> {
    options.validate()?;
    protocol.validate(firmware)?;
    let resolved = resolve_sweeps(protocol, firmware, hardware_sweeps)?;
    let timing = firmware.timing_cycles();

    let mut directives: Vec<Directive> = Vec::new();

    for channel in protocol.referenced_generators() {
        let config = protocol.generator_config(channel)?;
        directives.push(Directive::DeclareGenerator(DeclareGenerator {
            channel,
            nyquist_zone: config.nyquist_zone.as_int(),
        }));
    }
    for channel in protocol.referenced_readouts() {
        let config = protocol.readout_config(channel)?;
        let frequency_code = firmware
            .readout_frequency(channel, config.matching_generator)?
            .float_to_int(config.lo_frequency)?;
        let window = LinearQuantizer::new(firmware.readout_fabric_hz(channel)?, 32);
        directives.push(Directive::DeclareReadout(DeclareReadout {
            channel,
            length_cycles: window.float_to_int(config.window_length)?,
            frequency_code,
            matching_generator: config.matching_generator,
        }));
        if config.style == qsweep_dsl::ReadoutStyle::Sequenced {
            directives.push(Directive::ConfigureReadout(ConfigureReadout {
                channel,
                frequency_code,
            }));
        }
    }

    for instruction in protocol.instructions() {
        let Instruction::PlayPulse(pulse) = instruction else {
            continue;
        };
        let channel = pulse.generator;
        let config = protocol.generator_config(channel)?;
        let frequency_code = firmware
            .generator_frequency(channel, config.matching_readout)?
            .float_to_int(store.require(&pulse.frequency)?)?;
        let phase_code = firmware
            .generator_phase(channel)?
            .float_to_int(store.require(&pulse.phase)?)?;
        let gain_code = firmware
            .generator_gain(channel)?
            .float_to_int(store.require(&pulse.gain)?)?;
        let mode_code = firmware
            .mode_encoder(channel, pulse.control)?
            .encode(store.require(&pulse.length)?)?;
        directives.push(Directive::ConfigurePulse(ConfigurePulse {
            channel,
            style: pulse.style,
            frequency_code,
            phase_code,
            gain_code,
            mode_code,
        }));
    }

    // Reverse declaration order; every attached sweep nests inside the
    // previous one, so the first-declared sweep ends up innermost.
    for sweep in resolved.iter().rev() {
        directives.push(Directive::RegisterSweep(RegisterSweep {
            binding: sweep.binding,
            start: sweep.start_int(),
            step: sweep.step_int,
            count: sweep.count() as u32,
        }));
    }

    directives.push(Directive::Settle(Settle {
        cycles: SETTLE_CYCLES,
    }));

    for instruction in protocol.instructions() {
        match instruction {
            Instruction::PlayPulse(pulse) => {
                let t_cycles = match &pulse.t {
                    TimeSpec::Auto => None,
                    TimeSpec::At(t) => Some(timing.float_to_int(store.require(t)?)?),
                };
                directives.push(Directive::SchedulePulse(SchedulePulse {
                    channel: pulse.generator,
                    t_cycles,
                }));
            }
            Instruction::Trigger(trigger) => {
                directives.push(Directive::ScheduleTrigger(ScheduleTrigger {
                    readouts: trigger.readouts.clone(),
                    generator: trigger.generator,
                    trig_offset_cycles: timing.float_to_int(store.require(&trigger.trig_offset)?)?,
                    sync_delay_cycles: timing.float_to_int(store.require(&trigger.sync_delay)?)?,
                }));
            }
            Instruction::Delay(delay) => {
                directives.push(Directive::Advance(Advance {
                    cycles: timing.float_to_int(store.require(&delay.time)?)?,
                }));
            }
        }
    }

    let readout_shape: Vec<ReadoutShape> = protocol
        .reads_per_shot()
        .into_iter()
        .map(|(channel, reads_per_shot)| ReadoutShape {
            channel,
            reads_per_shot,
        })
        .collect();
    let sweep_axes: Vec<SweepAxis> = resolved
        .iter()
        .rev()
        .map(|sweep| SweepAxis {
            parameter: sweep.parameter.clone(),
            values: sweep.values.clone(),
        })
        .collect();

    qsweep_log::debug!(
        "built program '{}': {} directives, {} sweep axes, {} readout channels",
        protocol.name,
        directives.len(),
        sweep_axes.len(),
        readout_shape.len()
    );

    Ok(BuiltProgram {
        directives,
        reps: options.reps,
        initial_delay_cycles: timing.float_to_int(options.initial_delay)?,
        final_delay_cycles: timing.float_to_int(options.final_delay)?,
        final_wait_cycles: timing.float_to_int(options.final_wait)?,
        readout_shape,
        sweep_axes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use qsweep_dsl::{
        GeneratorChannel, GeneratorRegister, Parameter, ParameterStoreBuilder, PlayPulse,
        PulseStyle, ReadoutChannel, ReadoutStyle, Trigger, Unit,
    };
    use qsweep_units::PulseControl;

    const FIRMWARE_JSON: &str = r#"
    {
        "timing_clock_mhz": 430.08,
        "generators": [
            {
                "sampling_mhz": 9830.4,
                "samples_per_cycle": 16,
                "frequency_bits": 32,
                "phase_bits": 32,
                "gain_bits": 16,
                "envelope_length_bits": 16
            }
        ],
        "readouts": [
            {
                "sampling_mhz": 2457.6,
                "samples_per_cycle": 8,
                "frequency_bits": 32
            }
        ]
    }
    "#;

    fn firmware() -> FirmwareConfig {
        FirmwareConfig::from_json(FIRMWARE_JSON).unwrap()
    }

    fn freq() -> Parameter {
        Parameter::new(10, "pulse_freq", Unit::Hertz)
    }

    fn phase() -> Parameter {
        Parameter::new(11, "pulse_phase", Unit::Degree).with_domain(-180.0, 180.0)
    }

    fn gain() -> Parameter {
        Parameter::new(12, "pulse_gain", Unit::Gain).with_domain(-1.0, 1.0)
    }

    fn length() -> Parameter {
        Parameter::new(13, "pulse_length", Unit::Second)
    }

    fn protocol() -> Protocol {
        let mut protocol = Protocol::new("transmission");
        protocol.add_generator(GeneratorChannel::new(0).with_matching_readout(0));
        protocol.add_readout(
            ReadoutChannel::new(0)
                .with_matching_generator(0)
                .with_lo_frequency(1.2e9)
                .with_window_length(10e-6),
        );
        protocol.add_instruction(Instruction::PlayPulse(PlayPulse {
            generator: 0,
            style: PulseStyle::Const,
            control: PulseControl::default(),
            frequency: freq(),
            phase: phase(),
            gain: gain(),
            length: length(),
            t: TimeSpec::Auto,
        }));
        protocol.add_instruction(Instruction::Trigger(Trigger {
            readouts: vec![0],
            generator: Some(0),
            trig_offset: Parameter::new(14, "adc_trig_offset", Unit::Second),
            sync_delay: Parameter::new(15, "relax_delay", Unit::Second),
        }));
        protocol
    }

    fn store() -> ParameterStore {
        ParameterStoreBuilder::new()
            .with_parameter(freq(), 1.2e9)
            .with_parameter(phase(), 0.0)
            .with_parameter(gain(), 0.5)
            .with_parameter(length(), 10e-6)
            .with_parameter(Parameter::new(14, "adc_trig_offset", Unit::Second), 0.0)
            .with_parameter(Parameter::new(15, "relax_delay", Unit::Second), 1e-3)
            .build()
            .unwrap()
    }

    fn directive_tags(program: &BuiltProgram) -> Vec<&'static str> {
        program
            .directives
            .iter()
            .map(|directive| match directive {
                Directive::DeclareGenerator(_) => "declare_generator",
                Directive::DeclareReadout(_) => "declare_readout",
                Directive::ConfigureReadout(_) => "configure_readout",
                Directive::ConfigurePulse(_) => "configure_pulse",
                Directive::RegisterSweep(_) => "register_sweep",
                Directive::Settle(_) => "settle",
                Directive::SchedulePulse(_) => "schedule_pulse",
                Directive::ScheduleTrigger(_) => "schedule_trigger",
                Directive::Advance(_) => "advance",
            })
            .collect()
    }

    #[test]
    fn test_directive_order() {
        let program = build(
            &protocol(),
            &store(),
            &firmware(),
            &[],
            &ProgramOptions::default(),
        )
        .unwrap();
        assert_eq!(
            directive_tags(&program),
            vec![
                "declare_generator",
                "declare_readout",
                "configure_pulse",
                "settle",
                "schedule_pulse",
                "schedule_trigger",
            ]
        );
        assert_eq!(program.points_per_read(), 1);
        assert_eq!(program.readout_shape.len(), 1);
        assert_eq!(program.readout_shape[0].reads_per_shot, 1);
    }

    #[test]
    fn test_sequenced_readout_gets_configure_directive() {
        let template = protocol();
        let mut sequenced = Protocol::new("transmission");
        sequenced.add_generator(GeneratorChannel::new(0).with_matching_readout(0));
        sequenced.add_readout(
            ReadoutChannel::new(0)
                .with_style(ReadoutStyle::Sequenced)
                .with_matching_generator(0)
                .with_lo_frequency(1.2e9),
        );
        for instruction in template.instructions() {
            sequenced.add_instruction(instruction.clone());
        }
        let program = build(
            &sequenced,
            &store(),
            &firmware(),
            &[],
            &ProgramOptions::default(),
        )
        .unwrap();
        assert!(directive_tags(&program).contains(&"configure_readout"));
    }

    #[test]
    fn test_settle_follows_configuration() {
        let program = build(
            &protocol(),
            &store(),
            &firmware(),
            &[],
            &ProgramOptions::default(),
        )
        .unwrap();
        let tags = directive_tags(&program);
        let settle = tags.iter().position(|&t| t == "settle").unwrap();
        let first_body = tags.iter().position(|&t| t == "schedule_pulse").unwrap();
        assert!(settle < first_body);
        let Directive::Settle(settle) = &program.directives[settle] else {
            unreachable!();
        };
        assert_eq!(settle.cycles, 200);
    }

    #[test]
    fn test_sweeps_attach_in_reverse_declaration_order() {
        let sweep_x = HardwareSweep::new(gain(), 0.0, 0.5, 5).unwrap();
        let sweep_y = HardwareSweep::new(freq(), 1.0e9, 1.4e9, 3).unwrap();
        let program = build(
            &protocol(),
            &store(),
            &firmware(),
            &[sweep_x, sweep_y],
            &ProgramOptions::default(),
        )
        .unwrap();
        let sweeps: Vec<&RegisterSweep> = program
            .directives
            .iter()
            .filter_map(|directive| match directive {
                Directive::RegisterSweep(sweep) => Some(sweep),
                _ => None,
            })
            .collect();
        // declared [gain, freq]: freq attaches first, gain nests inside it
        // as the innermost loop
        assert_eq!(sweeps.len(), 2);
        assert_eq!(sweeps[0].binding.register, GeneratorRegister::Frequency);
        assert_eq!(sweeps[1].binding.register, GeneratorRegister::Gain);
        // axes are reported in build order, innermost last
        assert_eq!(program.sweep_axes[0].parameter.name, "pulse_freq");
        assert_eq!(program.sweep_axes[1].parameter.name, "pulse_gain");
        assert_eq!(program.points_per_read(), 15);
    }

    #[test]
    fn test_unbound_sweep_parameter_is_fatal() {
        let stray = Parameter::new(99, "mystery", Unit::Gain);
        let sweep = HardwareSweep::new(stray, 0.0, 1.0, 3).unwrap();
        let err = build(
            &protocol(),
            &store(),
            &firmware(),
            &[sweep],
            &ProgramOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Dsl(qsweep_dsl::Error::NoRegisterBinding { .. })
        ));
    }

    #[test]
    fn test_zero_reps_rejected() {
        let options = ProgramOptions {
            reps: 0,
            ..ProgramOptions::default()
        };
        assert!(matches!(
            build(&protocol(), &store(), &firmware(), &[], &options),
            Err(Error::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_length_sweep_routes_through_mode_register() {
        let sweep = HardwareSweep::new(length(), 1e-6, 2e-6, 5).unwrap();
        let program = build(
            &protocol(),
            &store(),
            &firmware(),
            &[sweep],
            &ProgramOptions::default(),
        )
        .unwrap();
        let Some(Directive::RegisterSweep(sweep)) = program
            .directives
            .iter()
            .find(|d| matches!(d, Directive::RegisterSweep(_)))
        else {
            panic!("no register sweep emitted");
        };
        assert_eq!(sweep.binding.register, GeneratorRegister::Mode);
        // axis coordinates are decoded lengths in seconds, not raw codes
        let axis = &program.sweep_axes[0];
        assert!(axis.values.iter().all(|&v| v > 0.5e-6 && v < 2.5e-6));
    }

    #[test]
    fn test_delay_instruction_advances_timeline() {
        let mut protocol = protocol();
        let settle_time = Parameter::new(16, "inter_pulse_delay", Unit::Second);
        protocol.add_instruction(Instruction::Delay(qsweep_dsl::Delay {
            time: settle_time.clone(),
        }));
        let mut store = store();
        store.set(&settle_time, 5e-6).unwrap();
        let program = build(&protocol, &store, &firmware(), &[], &ProgramOptions::default())
            .unwrap();
        let Some(Directive::Advance(advance)) = program
            .directives
            .iter()
            .find(|d| matches!(d, Directive::Advance(_)))
        else {
            panic!("no advance directive emitted");
        };
        assert_eq!(advance.cycles, 2150);
    }

    #[test]
    fn test_timing_controls_quantized() {
        let options = ProgramOptions {
            reps: 50,
            initial_delay: 1e-6,
            final_delay: 2e-6,
            final_wait: 0.0,
        };
        let program = build(&protocol(), &store(), &firmware(), &[], &options).unwrap();
        assert_eq!(program.reps, 50);
        assert_eq!(program.initial_delay_cycles, 430);
        assert_eq!(program.final_delay_cycles, 860);
        assert_eq!(program.final_wait_cycles, 0);
    }
}
