use handlebars::{Handlebars, no_escape};
use serde_json::{Value, json};

use super::EmitError;
use super::ir::{ComponentIr, FieldBlock};

/// Renders a [`ComponentIr`] in a single pass through registered templates.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, EmitError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, source)
                .map_err(|err| EmitError::Template {
                    name,
                    source: Box::new(err),
                })?;
        }
        Ok(Self { registry })
    }

    pub fn render(&self, ir: &ComponentIr) -> Result<String, EmitError> {
        let blocks = ir
            .fields
            .iter()
            .map(|block| self.render_field(block))
            .collect::<Result<Vec<_>, _>>()?;

        let schema = ir
            .schema
            .iter()
            .map(|entry| json!({ "name": entry.name, "expr": entry.expr.to_string() }))
            .collect::<Vec<_>>();
        let defaults = ir
            .defaults
            .iter()
            .map(|entry| json!({ "name": entry.name, "value": entry.value.to_string() }))
            .collect::<Vec<_>>();

        let password_support = if ir.password_support {
            PASSWORD_INPUT_SUPPORT
        } else {
            ""
        };
        let file_preview_support = if ir.file_preview_support {
            FILE_PREVIEW_SUPPORT
        } else {
            ""
        };

        let context = json!({
            "imports": ir.imports.lines().join("\n"),
            "password_support": password_support,
            "file_preview_support": file_preview_support,
            "schema": schema,
            "component_name": ir.component_name,
            "title": ir.title,
            "defaults": defaults,
            "container_class": ir.container_class,
            "field_blocks": blocks.join("\n\n"),
        });
        self.render_template("component", &context)
    }

    pub fn render_field(&self, block: &FieldBlock) -> Result<String, EmitError> {
        let attributes = block
            .control
            .attributes()
            .iter()
            .map(|attribute| Value::String(attribute.to_string()))
            .collect::<Vec<_>>();
        let options = block
            .control
            .options()
            .iter()
            .map(|option| {
                json!({
                    "label": option.label,
                    "value": option.value,
                    "field": block.name,
                })
            })
            .collect::<Vec<_>>();

        let context = json!({
            "name": block.name,
            "label": block.label,
            "marker": block.required_marker(),
            "placeholder": block.control.placeholder().unwrap_or_default(),
            "attributes": attributes,
            "options": options,
        });
        self.render_template(block.control.template_name(), &context)
    }

    fn render_template(&self, name: &'static str, context: &Value) -> Result<String, EmitError> {
        self.registry
            .render(name, context)
            .map_err(|err| EmitError::Render { name, source: err })
    }
}

const TEMPLATES: [(&str, &str); 11] = [
    ("component", COMPONENT),
    ("field_input", FIELD_INPUT),
    ("field_password", FIELD_PASSWORD),
    ("field_number", FIELD_NUMBER),
    ("field_textarea", FIELD_TEXTAREA),
    ("field_select", FIELD_SELECT),
    ("field_checkbox", FIELD_CHECKBOX),
    ("field_checkbox_group", FIELD_CHECKBOX_GROUP),
    ("field_radio", FIELD_RADIO),
    ("field_date", FIELD_DATE),
    ("field_file", FIELD_FILE),
];

// Block helpers never sit alone on a line, so output does not depend on
// standalone-line whitespace handling.

const COMPONENT: &str = r##"{{imports}}
{{password_support}}
{{file_preview_support}}
const formSchema = z.object({
{{#each schema}}  {{name}}: {{expr}},
{{/each}}})

type FormValues = z.infer<typeof formSchema>

export default function {{component_name}}() {
  const form = useForm<FormValues>({
    resolver: zodResolver(formSchema),
    defaultValues: {
{{#each defaults}}      {{name}}: {{value}},
{{/each}}    },
  })

  function onSubmit(data: FormValues) {
    // Handle form submission
    console.log(data)
  }

  return (
    <div className="space-y-6">
      <h2 className="text-2xl font-bold">{{title}}</h2>

      <Form {...form}>
        <form onSubmit={form.handleSubmit(onSubmit)} className="space-y-6">
          <div className="{{container_class}}">
{{field_blocks}}
          </div>

          <div className="pt-4">
            <Button type="submit">Submit</Button>
          </div>
        </form>
      </Form>
    </div>
  )
}
"##;

const FIELD_INPUT: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <FormControl>
          <Input
            placeholder="{{placeholder}}"
            {...field}{{#each attributes}}
            {{this}}{{/each}}
            className={form.formState.errors.{{name}} ? "border-destructive" : ""}
          />
        </FormControl>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_PASSWORD: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <FormControl>
          <PasswordInput
            placeholder="{{placeholder}}"
            {...field}{{#each attributes}}
            {{this}}{{/each}}
            className={form.formState.errors.{{name}} ? "border-destructive" : ""}
          />
        </FormControl>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_NUMBER: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <FormControl>
          <Input
            type="number"
            placeholder="{{placeholder}}"{{#each attributes}}
            {{this}}{{/each}}
            {...field}
            className={form.formState.errors.{{name}} ? "border-destructive" : ""}
          />
        </FormControl>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_TEXTAREA: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <FormControl>
          <Textarea
            placeholder="{{placeholder}}"{{#each attributes}}
            {{this}}{{/each}}
            {...field}
            className={form.formState.errors.{{name}} ? "border-destructive" : ""}
          />
        </FormControl>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_SELECT: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <Select onValueChange={field.onChange} defaultValue={field.value} value={field.value}>
          <FormControl>
            <SelectTrigger className={form.formState.errors.{{name}} ? "border-destructive" : ""}>
              <SelectValue placeholder="Select an option" />
            </SelectTrigger>
          </FormControl>
          <SelectContent>{{#each options}}
            <SelectItem value="{{value}}">{{label}}</SelectItem>{{/each}}
          </SelectContent>
        </Select>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_CHECKBOX: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem className="flex flex-row items-start space-x-3 space-y-0 rounded-md p-4">
        <FormControl>
          <Checkbox
            checked={field.value}
            onCheckedChange={field.onChange}
          />
        </FormControl>
        <div className="space-y-1 leading-none">
          <FormLabel>{{label}}{{marker}}</FormLabel>
          <FormMessage />
        </div>
      </FormItem>
    )}
  />"##;

const FIELD_CHECKBOX_GROUP: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={() => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <div className="space-y-2">{{#each options}}
          <FormField
            control={form.control}
            name="{{field}}"
            render={({ field }) => {
              return (
                <FormItem
                  key="{{value}}"
                  className="flex flex-row items-start space-x-3 space-y-0"
                >
                  <FormControl>
                    <Checkbox
                      checked={field.value?.includes("{{value}}")}
                      onCheckedChange={(checked) => {
                        return checked
                          ? field.onChange([...field.value, "{{value}}"])
                          : field.onChange(
                              field.value?.filter(
                                (value) => value !== "{{value}}"
                              )
                            )
                      }}
                    />
                  </FormControl>
                  <FormLabel className="font-normal">
                    {{label}}
                  </FormLabel>
                </FormItem>
              )
            }}
          />{{/each}}
        </div>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_RADIO: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem className="space-y-3">
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <FormControl>
          <RadioGroup
            onValueChange={field.onChange}
            defaultValue={field.value}
            className="flex flex-col space-y-1"
          >{{#each options}}
            <FormItem className="flex items-center space-x-3 space-y-0">
              <FormControl>
                <RadioGroupItem value="{{value}}" />
              </FormControl>
              <FormLabel className="font-normal">
                {{label}}
              </FormLabel>
            </FormItem>{{/each}}
          </RadioGroup>
        </FormControl>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_DATE: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field }) => (
      <FormItem>
        <FormLabel>{{label}}{{marker}}</FormLabel>
        <FormControl>
          <Input
            type="date"
            {...field}{{#each attributes}}
            {{this}}{{/each}}
            className={form.formState.errors.{{name}} ? "border-destructive" : ""}
          />
        </FormControl>
        <FormMessage />
      </FormItem>
    )}
  />"##;

const FIELD_FILE: &str = r##"  <FormField
    control={form.control}
    name="{{name}}"
    render={({ field: { value, onChange, ...fieldProps } }) => {
      const [fileState, setFileState] = useState(null)

      return (
        <FormItem>
          <FormLabel>{{label}}{{marker}}</FormLabel>
          <FormControl>
            <Input
              type="file"
              onChange={(e) => {
                const file = e.target.files?.[0] || null
                onChange(file)
                setFileState(file)
              }}
              {...fieldProps}
              className={`border-dashed ${form.formState.errors.{{name}} ? "border-destructive" : ""}`}
            />
          </FormControl>
          <FilePreview
            file={fileState}
            onRemove={() => {
              onChange(null)
              setFileState(null)
              // Reset the file input
              const fileInput = document.querySelector(`input[name="{{name}}"]`)
              if (fileInput) fileInput.value = ""
            }}
          />
          <FormMessage />
        </FormItem>
      )
    }}
  />"##;

/// Inline password input, emitted when a password field is present.
pub const PASSWORD_INPUT_SUPPORT: &str = r##"
import { Eye, EyeOff } from 'lucide-react'

function PasswordInput({ className, ...props }) {
  const [showPassword, setShowPassword] = useState(false)

  return (
    <div className="relative">
      <Input
        type={showPassword ? "text" : "password"}
        className={`pr-10 ${className || ""}`}
        {...props}
      />
      <Button
        type="button"
        variant="ghost"
        size="sm"
        className="absolute right-0 top-0 h-full px-3 py-2 hover:bg-transparent"
        onClick={() => setShowPassword(!showPassword)}
        tabIndex={-1}
      >
        {showPassword ? (
          <EyeOff className="h-4 w-4 text-muted-foreground" aria-hidden="true" />
        ) : (
          <Eye className="h-4 w-4 text-muted-foreground" aria-hidden="true" />
        )}
        <span className="sr-only">{showPassword ? "Hide password" : "Show password"}</span>
      </Button>
    </div>
  )
}
"##;

/// Inline file preview, emitted when a file field is present.
pub const FILE_PREVIEW_SUPPORT: &str = r##"
// File preview component
import { X } from 'lucide-react'

function FilePreview({ file, onRemove, className = "" }) {
  const [preview, setPreview] = useState(null)
  const [fileType, setFileType] = useState(null)

  useEffect(() => {
    if (!file) {
      setPreview(null)
      setFileType(null)
      return
    }

    if (file.type.startsWith("image/")) {
      const reader = new FileReader()
      reader.onloadend = () => {
        setPreview(reader.result)
        setFileType("image")
      }
      reader.readAsDataURL(file)
    } else {
      setFileType("other")
    }

    return () => {
      if (preview && fileType === "image") {
        URL.revokeObjectURL(preview)
      }
    }
  }, [file])

  if (!file) return null

  const formatFileSize = (bytes) => {
    if (bytes < 1024) return bytes + " bytes"
    else if (bytes < 1048576) return (bytes / 1024).toFixed(1) + " KB"
    else return (bytes / 1048576).toFixed(1) + " MB"
  }

  return (
    <div className={`mt-2 ${className}`}>
      {fileType === "image" && preview ? (
        <div className="relative">
          <img
            src={preview || "/placeholder.svg"}
            alt="Preview"
            className="max-h-48 max-w-full rounded-md object-contain border p-1"
          />
          {onRemove && (
            <Button
              type="button"
              variant="destructive"
              size="icon"
              className="absolute top-2 right-2 h-6 w-6 rounded-full"
              onClick={onRemove}
            >
              <X className="h-4 w-4" />
            </Button>
          )}
        </div>
      ) : (
        <div className="flex items-center gap-2 p-3 border rounded-md bg-muted/30">
          <div className="flex-1 truncate">
            <p className="text-sm font-medium truncate">{file.name}</p>
            <p className="text-xs text-muted-foreground">{formatFileSize(file.size)}</p>
          </div>
          {onRemove && (
            <Button
              type="button"
              variant="ghost"
              size="icon"
              className="h-6 w-6 rounded-full hover:bg-destructive/10 hover:text-destructive"
              onClick={onRemove}
            >
              <X className="h-4 w-4" />
            </Button>
          )}
        </div>
      )}
    </div>
  )
}
"##;
